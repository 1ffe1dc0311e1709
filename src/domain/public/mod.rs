//! Public engine domain - anonymous assessments, intake sessions and tokens.

mod assessment;
mod group;
mod intake;
mod result;
mod token;

pub use assessment::{
    ContactDetails, ContactInput, GroupTag, PublicAssessment, PublicAssessmentDraft,
};
pub use group::{summarize_groups, GroupSelector, GroupSummary};
pub use intake::{IntakeSession, NextStep};
pub use result::{answer_digest, AnswerDigest, DigestLine, ResultDomain, ResultSummary};
pub use token::{ResultToken, SessionHandle};
