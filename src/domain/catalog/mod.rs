//! Catalog - assessment types, versions, domains and questions.
//!
//! Owns the version lifecycle (`draft → published → archived`) and the
//! rule that only drafts may be edited.

mod assessment_type;
mod structure;
mod tree;
mod version;

pub use assessment_type::{
    ensure_unique_type_name, AssessmentType, PublicIntakeSettings, TypeDraft,
};
pub use structure::{plan_reorder, Domain, DomainFields, Question, QuestionFields};
pub use tree::{
    DomainBlueprint, DomainNode, LightDomain, LightSubset, VersionBlueprint, VersionTotals,
    VersionTree,
};
pub use version::{
    publish_replacing, AssessmentVersion, VersionDraft, VersionStatus, INITIAL_VERSION_LABEL,
};

#[cfg(test)]
pub(crate) use tree::fixtures;
