//! HTTP adapter for administrator and respondent sessions.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::auth_routes;
