//! HTTP adapter for client organizations and respondent accounts.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::client_routes;
