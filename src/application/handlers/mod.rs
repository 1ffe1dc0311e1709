//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, one
//! module per subject area.

mod access;
mod lookup;

pub mod auth;
pub mod catalog;
pub mod clients;
pub mod lead;
pub mod project;
pub mod public;
pub mod statistics;

#[cfg(test)]
pub(crate) mod testing;
