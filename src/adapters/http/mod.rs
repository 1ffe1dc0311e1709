//! HTTP adapter - REST surface over the application handlers.
//!
//! Each area has its own module with DTOs, handlers and routes; they
//! share one [`AppState`] and are assembled by [`build_router`].

pub mod auth;
pub mod catalog;
pub mod clients;
pub mod error;
pub mod groups;
pub mod leads;
pub mod middleware;
pub mod projects;
pub mod public;
pub mod request;
pub mod router;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use router::{build_router, HttpSettings};
pub use state::{AppState, Repositories};
