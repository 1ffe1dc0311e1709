//! Domain layer - pure business logic with no I/O.

pub mod catalog;
pub mod client;
pub mod foundation;
pub mod lead;
pub mod project;
pub mod public;
pub mod response;
pub mod scoring;
