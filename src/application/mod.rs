//! Application layer: manifests and the mount service
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod manifest;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use manifest::{Manifest, NodeDecl};
