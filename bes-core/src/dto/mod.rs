//! Data Transfer Objects
//!
//! Request bodies sent to the Batch Execution Service.

pub mod job;
