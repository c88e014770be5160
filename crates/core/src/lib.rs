//! gmu-core: core types for the gmu object storage toolkit
//!
//! This crate provides:
//! - `S3Path`, the bucket/key value type and its URI form
//! - The `ObjectStore` trait for forwarded S3 operations
//! - Client configuration
//! - Tag merging and telemetry constants
//!
//! It does not depend on any S3 SDK.

pub mod config;
pub mod error;
pub mod path;
pub mod tagging;
pub mod telemetry;
pub mod traits;

pub use config::{ClientConfig, Config, ConfigManager};
pub use error::{Error, ParseError, Result, StoreError};
pub use path::S3Path;
pub use tagging::merge_tags;
pub use traits::ObjectStore;

#[cfg(feature = "mock")]
pub use traits::MockObjectStore;
