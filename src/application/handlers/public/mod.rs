//! Public engine handlers - anonymous intake and result delivery.

mod complete_intake;
mod contact_step;
mod context;
mod deliver_result;
mod domain_step;
mod fetch_result;
mod start_intake;
mod submit_domain;

pub use complete_intake::{CompleteIntakeCommand, CompleteIntakeHandler, CompleteIntakeResult};
pub use contact_step::{ContactStep, GetContactStepHandler, GetContactStepQuery};
pub use deliver_result::{DeliverResultCommand, DeliverResultHandler};
pub use domain_step::{DomainStep, GetDomainStepHandler, GetDomainStepQuery, StepQuestion};
pub use fetch_result::{FetchResultHandler, FetchResultQuery};
pub use start_intake::{StartIntakeCommand, StartIntakeHandler, StartIntakeResult};
pub use submit_domain::{SubmitDomainCommand, SubmitDomainHandler};
