//! Lead pipeline handlers.

mod comment_lead;
mod delete_lead;
mod materialize_lead;
mod queries;
mod update_lead;

pub use comment_lead::{CommentOnLeadCommand, CommentOnLeadHandler};
pub use delete_lead::{DeleteLeadCommand, DeleteLeadHandler};
pub use materialize_lead::{
    MaterializeLeadCommand, MaterializeLeadHandler, MaterializeLeadResult,
};
pub use queries::{LeadDetail, LeadQueries};
pub use update_lead::{UpdateLeadCommand, UpdateLeadHandler, UpdateLeadResult};
