//! Strongly-typed identifier value objects.
//!
//! Every persisted entity is keyed by an opaque integer assigned by the
//! store. The newtypes keep a `QuestionId` from being passed where a
//! `DomainId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a store-assigned identifier.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier.
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of an assessment type (questionnaire family).
    TypeId
);
define_id!(
    /// Identifier of a questionnaire version.
    VersionId
);
define_id!(
    /// Identifier of a domain inside a version.
    DomainId
);
define_id!(
    /// Identifier of a question inside a domain.
    QuestionId
);
define_id!(
    /// Identifier of a client organization.
    ClientId
);
define_id!(
    /// Identifier of a respondent belonging to a client.
    RespondentId
);
define_id!(
    /// Identifier of a project.
    ProjectId
);
define_id!(
    /// Identifier of a project-to-version binding.
    ProjectAssessmentId
);
define_id!(
    /// Identifier of an anonymous public assessment.
    PublicAssessmentId
);
define_id!(
    /// Identifier of a lead.
    LeadId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_displays_raw_value() {
        assert_eq!(TypeId::new(42).to_string(), "42");
    }

    #[test]
    fn id_parses_from_string() {
        let id: QuestionId = "17".parse().unwrap();
        assert_eq!(id, QuestionId::new(17));
    }

    #[test]
    fn id_rejects_non_numeric_string() {
        assert!("abc".parse::<LeadId>().is_err());
    }

    #[test]
    fn id_serializes_transparently() {
        let json = serde_json::to_string(&ProjectId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
