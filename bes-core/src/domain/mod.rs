//! Core domain types
//!
//! These types mirror what the Batch Execution Service sends and receives.
//! They are shared between the HTTP client (which decodes them) and the CLI
//! (which reports them).

pub mod blob;
pub mod job;
