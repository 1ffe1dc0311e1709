//! Project engine domain - collaborative projects, bindings and progress.
//!
//! Per binding: `open → finalized`. Per project:
//! `active → completable (all finalized) → released`.

mod aggregate;
mod binding;
mod progress;

pub use aggregate::{Membership, Project, ProjectDraft, ProjectState};
pub use binding::ProjectAssessment;
pub use progress::{overall_progress, Progress};
