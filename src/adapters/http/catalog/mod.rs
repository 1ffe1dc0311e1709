//! HTTP adapter for the questionnaire catalog.
//!
//! Types, versions and the domain/question structure of drafts. Every
//! route requires an administrator.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::catalog_routes;
