//! HTTP adapter for collaborative projects.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::{project_admin_routes, respondent_routes};
