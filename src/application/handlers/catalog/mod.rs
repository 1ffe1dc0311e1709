//! Catalog command and query handlers.

mod clone_type;
mod configure_intake;
mod create_draft;
mod create_type;
mod delete_draft;
mod edit_draft;
mod publish_version;
mod queries;
mod update_type;
mod update_version_notes;

pub use clone_type::{CloneTypeCommand, CloneTypeHandler, CloneTypeResult};
pub use configure_intake::{ConfigureIntakeCommand, ConfigureIntakeHandler};
pub use create_draft::{CreateDraftCommand, CreateDraftHandler};
pub use create_type::{CreateTypeCommand, CreateTypeHandler, CreateTypeResult};
pub use delete_draft::{DeleteDraftCommand, DeleteDraftHandler};
pub use edit_draft::{DraftEdit, DraftEditResult, EditDraftHandler};
pub use publish_version::{PublishVersionCommand, PublishVersionHandler};
pub use queries::{CatalogQueries, TypeDetail, TypeOverview, VersionOverview};
pub use update_type::{UpdateTypeCommand, UpdateTypeHandler};
pub use update_version_notes::{UpdateVersionNotesCommand, UpdateVersionNotesHandler};
