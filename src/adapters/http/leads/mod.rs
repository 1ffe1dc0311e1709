//! HTTP adapter for leads materialized from public assessments.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::lead_routes;
