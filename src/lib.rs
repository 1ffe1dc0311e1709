//! Maturity Assessment - multi-tenant maturity assessment platform
//!
//! Administrators maintain a catalog of versioned questionnaires. Client
//! respondents score them together inside projects, and anonymous
//! visitors take a short public version whose completion becomes a sales
//! lead. Scores, group statistics and lead alerts are derived from the
//! recorded answers.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
