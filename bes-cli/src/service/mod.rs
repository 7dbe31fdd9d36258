//! Service layer
//!
//! The runner talks to the batch service and the blob store through these
//! traits. The HTTP clients implement them for real runs; tests substitute
//! in-memory fakes.

mod batch;
mod blob;

pub use batch::BatchService;
pub use blob::BlobService;
