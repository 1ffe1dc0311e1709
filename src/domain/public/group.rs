//! Grouping keys for public-assessment statistics.

use serde::Serialize;

use super::{GroupTag, PublicAssessment};
use crate::domain::catalog::AssessmentType;
use crate::domain::foundation::{Timestamp, TypeId};

/// Which completed assessments of a type a group view covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupSelector {
    /// Every completed assessment of the type, tagged or not.
    General,
    Tagged(GroupTag),
}

impl GroupSelector {
    pub fn from_tag(tag: Option<GroupTag>) -> Self {
        match tag {
            Some(tag) => GroupSelector::Tagged(tag),
            None => GroupSelector::General,
        }
    }

    pub fn includes(&self, assessment: &PublicAssessment) -> bool {
        match self {
            GroupSelector::General => true,
            GroupSelector::Tagged(tag) => assessment.group_tag() == Some(tag),
        }
    }

    pub fn tag(&self) -> Option<&GroupTag> {
        match self {
            GroupSelector::General => None,
            GroupSelector::Tagged(tag) => Some(tag),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            GroupSelector::General => "General",
            GroupSelector::Tagged(tag) => tag.as_str(),
        }
    }
}

/// One row of the group listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub type_id: TypeId,
    pub type_name: String,
    /// `None` is the implicit "General" group of the type.
    pub group_tag: Option<GroupTag>,
    pub completed_count: usize,
    pub last_completed_at: Option<Timestamp>,
}

/// Builds the group listing: one "General" row per type that takes public
/// intake or has completions, plus one row per distinct `(type, tag)`.
pub fn summarize_groups(
    types: &[AssessmentType],
    completed: &[PublicAssessment],
) -> Vec<GroupSummary> {
    let type_name = |id: TypeId| {
        types
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| format!("Type {}", id))
    };
    let mut rows: Vec<GroupSummary> = types
        .iter()
        .filter(|t| t.public_intake_enabled)
        .map(|t| GroupSummary {
            type_id: t.id,
            type_name: t.name.clone(),
            group_tag: None,
            completed_count: 0,
            last_completed_at: None,
        })
        .collect();

    for assessment in completed.iter().filter(|a| a.is_completed()) {
        let mut keys = vec![None];
        keys.extend(assessment.group_tag().cloned().map(Some));
        for key in keys {
            let position = rows
                .iter()
                .position(|r| r.type_id == assessment.type_id() && r.group_tag == key);
            let index = match position {
                Some(index) => index,
                None => {
                    rows.push(GroupSummary {
                        type_id: assessment.type_id(),
                        type_name: type_name(assessment.type_id()),
                        group_tag: key,
                        completed_count: 0,
                        last_completed_at: None,
                    });
                    rows.len() - 1
                }
            };
            let row = &mut rows[index];
            row.completed_count += 1;
            row.last_completed_at = row.last_completed_at.max(assessment.completed_at());
        }
    }
    rows.sort_by(|a, b| {
        a.type_name
            .cmp(&b.type_name)
            .then_with(|| a.group_tag.cmp(&b.group_tag))
    });
    rows
}
