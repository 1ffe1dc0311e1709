//! HTTP adapter for the anonymous public intake.
//!
//! - `GET /public/:type_id[?group=]` - Start or resume
//! - `GET|POST /public/:type_id/domain/:index` - Step view / submit
//! - `GET|POST /public/:type_id/data` - Contact capture / complete
//! - `GET /public/:type_id/result/:token` - Result summary
//! - `POST /public/:type_id/result/:token/email` - Deliver result

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::public_routes;
