//! ObjectStore trait definition
//!
//! One method per forwarded object store call. Implementations add no
//! retries, backoff or translation beyond what each method documents.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::path::S3Path;

/// Trait for S3-compatible storage operations
///
/// Implemented by the S3 adapter; a mock is generated with the `mock` feature.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Objects directly under `path`, treating `/` as a directory delimiter.
    /// Returns a single page.
    async fn list(&self, path: &S3Path) -> Result<Vec<S3Path>>;

    /// Common prefixes ("directories") directly under `path`
    async fn list_directories(&self, path: &S3Path) -> Result<Vec<S3Path>>;

    /// Object content as bytes
    async fn download(&self, path: &S3Path) -> Result<Vec<u8>>;

    /// Stream object content into `file`, returning the number of bytes written
    async fn download_to_file(&self, path: &S3Path, file: &mut tokio::fs::File) -> Result<u64>;

    /// Server-side copy
    async fn copy(&self, source: &S3Path, target: &S3Path) -> Result<()>;

    /// Write `data` to `path`
    async fn upload(&self, data: Vec<u8>, path: &S3Path) -> Result<()>;

    /// Delete every object whose key starts with `key/`, including keys
    /// nested several levels below it. An empty key lists under `/` and so
    /// leaves ordinary keys at the bucket root alone.
    async fn delete_recursive(&self, path: &S3Path) -> Result<()>;

    /// Empty and then remove a bucket
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    /// Delete a single object
    async fn delete_object(&self, path: &S3Path) -> Result<()>;

    /// Whether object metadata exists at `path`
    async fn exists(&self, path: &S3Path) -> Result<bool>;

    /// Create a bucket
    async fn create_bucket(&self, bucket: &str) -> Result<()>;

    /// Merge `tags` into the bucket's tag set. Existing values for the same
    /// key are replaced only when `overwrite` is set.
    async fn add_bucket_tags(
        &self,
        bucket: &str,
        tags: HashMap<String, String>,
        overwrite: bool,
    ) -> Result<()>;

    /// Turn on all four public access block settings
    async fn block_bucket_public_access(&self, bucket: &str) -> Result<()>;

    /// Default bucket encryption with the AWS managed KMS key
    async fn bucket_server_side_encryption(&self, bucket: &str) -> Result<()>;
}
