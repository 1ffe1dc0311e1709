//! Scoring engine - pure functions over stored answers.
//!
//! Projects score on 0..5 (means of answered questions); public assessments
//! score on 0..100 (sum over the maximum of answered questions).

mod group;
mod maturity;
mod project_scores;
mod public_scores;
mod recommendation;

pub use group::{aggregate, DomainAggregate, GroupSample, GroupStatistics};
pub use maturity::{MaturityLevel, ProjectMaturity};
pub use project_scores::{project_overall, score_binding, BindingScore, DomainScore};
pub use public_scores::{percentage, score_public, PublicDomainScore, PublicScores};
pub use recommendation::fallback_recommendation;
