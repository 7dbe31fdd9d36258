//! BES Core
//!
//! Wire types for the Batch Execution Service and the blob store it reads from.
//!
//! This crate contains:
//! - Domain types: blob references and job status as returned by the service
//! - DTOs: the execution request submitted to start a job

pub mod domain;
pub mod dto;
