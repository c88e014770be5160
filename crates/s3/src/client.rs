//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from gmu-core.
//! Every method is one SDK call (or one paginator walk); SDK errors are
//! returned through `Error::Store` untouched.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    Delete, ObjectIdentifier, PublicAccessBlockConfiguration, ServerSideEncryption,
    ServerSideEncryptionByDefault, ServerSideEncryptionConfiguration, ServerSideEncryptionRule,
    Tag, Tagging,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tokio::io::AsyncWriteExt;

use gmu_core::{ClientConfig, Error, ObjectStore, Result, S3Path, merge_tags};

/// Delimiter used to group keys into pseudo-directories
const DELIMITER: &str = "/";

/// Error code returned by GetBucketTagging when a bucket has no tags
const NO_SUCH_TAG_SET: &str = "NoSuchTagSet";

/// Everything but unreserved characters and `/` is escaped in a CopySource
const COPY_SOURCE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// S3 client wrapper
#[derive(Debug, Clone)]
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a new S3 client from connection options
    pub async fn new(config: &ClientConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let Some((access_key, secret_key)) = config.static_credentials() {
            let credentials = aws_credential_types::Credentials::new(
                access_key,
                secret_key,
                None, // session token
                None, // expiry
                "gmu-static-credentials",
            );
            loader = loader.credentials_provider(credentials);
        }

        let sdk_config = loader.load().await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(config.force_path_style);

        if let Some(endpoint) = config.endpoint_url() {
            tracing::debug!(%endpoint, "using custom endpoint");
            builder = builder.endpoint_url(endpoint);
        } else if config.disable_ssl {
            tracing::warn!("disable_ssl has no effect without a custom endpoint");
        }

        Ok(Self::from_client(aws_sdk_s3::Client::from_conf(builder.build())))
    }

    /// Wrap an already configured SDK client
    pub fn from_client(inner: aws_sdk_s3::Client) -> Self {
        Self { inner }
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    async fn list_base(
        &self,
        path: &S3Path,
    ) -> Result<aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output> {
        tracing::debug!(bucket = %path.bucket, prefix = %path.dir_prefix(), "list objects");
        self.inner
            .list_objects_v2()
            .bucket(&path.bucket)
            .prefix(path.dir_prefix())
            .delimiter(DELIMITER)
            .send()
            .await
            .map_err(Error::store)
    }

    /// Delete every object in `bucket` whose key starts with `prefix`,
    /// one DeleteObjects request per listed page
    async fn delete_prefix(&self, bucket: &str, prefix: Option<String>) -> Result<()> {
        let mut pages = self
            .inner
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(Error::store)?;
            let keys: Vec<String> = page
                .contents()
                .iter()
                .filter_map(|object| object.key().map(str::to_string))
                .collect();
            self.delete_keys(bucket, keys).await?;
        }

        Ok(())
    }

    async fn delete_keys(&self, bucket: &str, keys: Vec<String>) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        tracing::debug!(bucket, count = keys.len(), "delete objects");

        let objects = keys
            .into_iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::store)?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(Error::store)?;

        let response = self
            .inner
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(Error::store)?;

        if !response.errors().is_empty() {
            let failed: Vec<String> = response
                .errors()
                .iter()
                .map(|e| {
                    format!(
                        "{} ({})",
                        e.key().unwrap_or_default(),
                        e.code().unwrap_or("unknown")
                    )
                })
                .collect();
            tracing::warn!(bucket, ?failed, "failed to delete some objects");
            return Err(Error::Store(
                format!("failed to delete {} object(s): {}", failed.len(), failed.join(", ")).into(),
            ));
        }

        Ok(())
    }

    async fn bucket_tags(&self, bucket: &str) -> Result<Vec<(String, String)>> {
        match self.inner.get_bucket_tagging().bucket(bucket).send().await {
            Ok(output) => Ok(output
                .tag_set()
                .iter()
                .map(|tag| (tag.key().to_string(), tag.value().to_string()))
                .collect()),
            Err(e) if service_code(&e) == Some(NO_SUCH_TAG_SET) => Ok(Vec::new()),
            Err(e) => Err(Error::store(e)),
        }
    }
}

/// URL-encoded `bucket/key` for the CopySource header
fn copy_source(path: &S3Path) -> String {
    utf8_percent_encode(&path.join(), COPY_SOURCE_ESCAPE).to_string()
}

/// Error code of a service error, if the request reached the service
fn service_code<E: ProvideErrorMetadata, R>(err: &SdkError<E, R>) -> Option<&str> {
    err.as_service_error().and_then(|e| e.code())
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list(&self, path: &S3Path) -> Result<Vec<S3Path>> {
        let response = self.list_base(path).await?;

        Ok(response
            .contents()
            .iter()
            .filter_map(|object| object.key())
            .map(|key| S3Path::new(&path.bucket, key))
            .collect())
    }

    async fn list_directories(&self, path: &S3Path) -> Result<Vec<S3Path>> {
        let response = self.list_base(path).await?;

        Ok(response
            .common_prefixes()
            .iter()
            .filter_map(|prefix| prefix.prefix())
            .map(|prefix| S3Path::new(&path.bucket, prefix))
            .collect())
    }

    async fn download(&self, path: &S3Path) -> Result<Vec<u8>> {
        tracing::debug!(%path, "get object");
        let response = self
            .inner
            .get_object()
            .bucket(&path.bucket)
            .key(&path.key)
            .send()
            .await
            .map_err(Error::store)?;

        let data = response
            .body
            .collect()
            .await
            .map_err(Error::store)?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    async fn download_to_file(&self, path: &S3Path, file: &mut tokio::fs::File) -> Result<u64> {
        tracing::debug!(%path, "get object into file");
        let response = self
            .inner
            .get_object()
            .bucket(&path.bucket)
            .key(&path.key)
            .send()
            .await
            .map_err(Error::store)?;

        let mut body = response.body;
        let mut written = 0u64;
        while let Some(chunk) = body.try_next().await.map_err(Error::store)? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }

    async fn copy(&self, source: &S3Path, target: &S3Path) -> Result<()> {
        tracing::debug!(%source, %target, "copy object");
        self.inner
            .copy_object()
            .copy_source(copy_source(source))
            .bucket(&target.bucket)
            .key(&target.key)
            .send()
            .await
            .map_err(Error::store)?;

        Ok(())
    }

    async fn upload(&self, data: Vec<u8>, path: &S3Path) -> Result<()> {
        tracing::debug!(%path, size = data.len(), "put object");
        self.inner
            .put_object()
            .bucket(&path.bucket)
            .key(&path.key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(Error::store)?;

        Ok(())
    }

    async fn delete_recursive(&self, path: &S3Path) -> Result<()> {
        // An empty key gives "/", which matches no ordinary key. Emptying a
        // whole bucket is delete_bucket's job.
        let prefix = format!("{}{DELIMITER}", path.key.trim_end_matches(DELIMITER));
        tracing::debug!(bucket = %path.bucket, %prefix, "delete recursive");
        self.delete_prefix(&path.bucket, Some(prefix)).await
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        if let Err(e) = self.delete_prefix(bucket, None).await {
            tracing::error!(bucket, error = %e, "unable to remove objects from bucket for deletion");
            return Err(e);
        }

        tracing::info!(bucket, "removed all object(s) from bucket for deletion");

        self.inner
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(Error::store)?;

        Ok(())
    }

    async fn delete_object(&self, path: &S3Path) -> Result<()> {
        tracing::debug!(%path, "delete object");
        self.inner
            .delete_object()
            .bucket(&path.bucket)
            .key(&path.key)
            .send()
            .await
            .map_err(Error::store)?;

        Ok(())
    }

    async fn exists(&self, path: &S3Path) -> Result<bool> {
        match self
            .inner
            .head_object()
            .bucket(&path.bucket)
            .key(&path.key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) if matches!(service_code(&e), Some("NotFound" | "NoSuchKey")) => Ok(false),
            Err(e) => Err(Error::store(e)),
        }
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        tracing::debug!(bucket, "create bucket");
        self.inner
            .create_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(Error::store)?;

        Ok(())
    }

    async fn add_bucket_tags(
        &self,
        bucket: &str,
        tags: HashMap<String, String>,
        overwrite: bool,
    ) -> Result<()> {
        let existing = self.bucket_tags(bucket).await?;
        let merged = merge_tags(existing, tags, overwrite);

        tracing::debug!(bucket, count = merged.len(), overwrite, "put bucket tagging");

        let tag_set = merged
            .into_iter()
            .map(|(key, value)| Tag::builder().key(key).value(value).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::store)?;

        let tagging = Tagging::builder()
            .set_tag_set(Some(tag_set))
            .build()
            .map_err(Error::store)?;

        self.inner
            .put_bucket_tagging()
            .bucket(bucket)
            .tagging(tagging)
            .send()
            .await
            .map_err(Error::store)?;

        Ok(())
    }

    async fn block_bucket_public_access(&self, bucket: &str) -> Result<()> {
        tracing::debug!(bucket, "put public access block");
        let configuration = PublicAccessBlockConfiguration::builder()
            .block_public_acls(true)
            .block_public_policy(true)
            .ignore_public_acls(true)
            .restrict_public_buckets(true)
            .build();

        self.inner
            .put_public_access_block()
            .bucket(bucket)
            .public_access_block_configuration(configuration)
            .send()
            .await
            .map_err(Error::store)?;

        Ok(())
    }

    async fn bucket_server_side_encryption(&self, bucket: &str) -> Result<()> {
        tracing::debug!(bucket, "put bucket encryption");
        let by_default = ServerSideEncryptionByDefault::builder()
            .sse_algorithm(ServerSideEncryption::AwsKms)
            .build()
            .map_err(Error::store)?;

        let rule = ServerSideEncryptionRule::builder()
            .apply_server_side_encryption_by_default(by_default)
            .bucket_key_enabled(true)
            .build();

        let configuration = ServerSideEncryptionConfiguration::builder()
            .rules(rule)
            .build()
            .map_err(Error::store)?;

        self.inner
            .put_bucket_encryption()
            .bucket(bucket)
            .server_side_encryption_configuration(configuration)
            .send()
            .await
            .map_err(Error::store)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::operation::copy_object::CopyObjectOutput;
    use aws_sdk_s3::operation::delete_objects::DeleteObjectsOutput;
    use aws_sdk_s3::operation::get_bucket_tagging::{GetBucketTaggingError, GetBucketTaggingOutput};
    use aws_sdk_s3::operation::head_object::{HeadObjectError, HeadObjectOutput};
    use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
    use aws_sdk_s3::operation::put_bucket_tagging::PutBucketTaggingOutput;
    use aws_sdk_s3::types::Object;
    use aws_sdk_s3::types::error::NotFound;
    use aws_smithy_mocks::{RuleMode, mock, mock_client};

    fn service_error(code: &str) -> ErrorMetadata {
        ErrorMetadata::builder().code(code).message("test").build()
    }

    fn tag(key: &str, value: &str) -> Tag {
        Tag::builder().key(key).value(value).build().unwrap()
    }

    fn listing(keys: &[&str]) -> ListObjectsV2Output {
        keys.iter()
            .fold(ListObjectsV2Output::builder(), |b, key| {
                b.contents(Object::builder().key(*key).build())
            })
            .build()
    }

    #[tokio::test]
    async fn test_client_from_config() {
        let config = ClientConfig::new()
            .with_endpoint("localhost:9000")
            .with_disable_ssl(true)
            .with_credentials("minioadmin", "minioadmin")
            .with_force_path_style(true);

        let client = S3Client::new(&config).await.unwrap();
        let conf = client.inner().config();
        assert_eq!(conf.region().map(|r| r.to_string()).as_deref(), Some("us-west-2"));
    }

    #[test]
    fn test_copy_source_is_url_encoded() {
        let path = S3Path::new("src", "dir/with space+plus?.txt");
        assert_eq!(copy_source(&path), "src/dir/with%20space%2Bplus%3F.txt");
        assert_eq!(copy_source(&S3Path::new("src", "a-b_c.d~e")), "src/a-b_c.d~e");
    }

    #[tokio::test]
    async fn test_copy_sends_encoded_source() {
        let copy = mock!(aws_sdk_s3::Client::copy_object)
            .match_requests(|req| {
                req.copy_source() == Some("src/my%20file.txt")
                    && req.bucket() == Some("dst")
                    && req.key() == Some("backup/my file.txt")
            })
            .then_output(|| CopyObjectOutput::builder().build());
        let client = S3Client::from_client(mock_client!(aws_sdk_s3, [&copy]));

        client
            .copy(
                &S3Path::new("src", "my file.txt"),
                &S3Path::new("dst", "backup/my file.txt"),
            )
            .await
            .unwrap();
        assert_eq!(copy.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_exists_maps_not_found_to_false() {
        let found = mock!(aws_sdk_s3::Client::head_object)
            .match_requests(|req| req.key() == Some("present"))
            .then_output(|| HeadObjectOutput::builder().build());
        let modeled = mock!(aws_sdk_s3::Client::head_object)
            .match_requests(|req| req.key() == Some("gone"))
            .then_error(|| HeadObjectError::NotFound(NotFound::builder().build()));
        let no_such_key = mock!(aws_sdk_s3::Client::head_object)
            .match_requests(|req| req.key() == Some("never-written"))
            .then_error(|| HeadObjectError::generic(service_error("NoSuchKey")));
        let client = S3Client::from_client(mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            [&found, &modeled, &no_such_key]
        ));

        assert!(client.exists(&S3Path::new("bucket", "present")).await.unwrap());
        assert!(!client.exists(&S3Path::new("bucket", "gone")).await.unwrap());
        assert!(!client.exists(&S3Path::new("bucket", "never-written")).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_propagates_other_errors() {
        let denied = mock!(aws_sdk_s3::Client::head_object)
            .then_error(|| HeadObjectError::generic(service_error("AccessDenied")));
        let client = S3Client::from_client(mock_client!(aws_sdk_s3, [&denied]));

        let err = client.exists(&S3Path::new("bucket", "secret")).await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn test_add_bucket_tags_to_untagged_bucket() {
        let get_tags = mock!(aws_sdk_s3::Client::get_bucket_tagging)
            .then_error(|| GetBucketTaggingError::generic(service_error(NO_SUCH_TAG_SET)));
        let put_tags = mock!(aws_sdk_s3::Client::put_bucket_tagging)
            .match_requests(|req| {
                req.bucket() == Some("data")
                    && req
                        .tagging()
                        .is_some_and(|t| t.tag_set() == [tag("team", "ml")])
            })
            .then_output(|| PutBucketTaggingOutput::builder().build());
        let client = S3Client::from_client(mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            [&get_tags, &put_tags]
        ));

        let tags = HashMap::from([("team".to_string(), "ml".to_string())]);
        client.add_bucket_tags("data", tags, false).await.unwrap();
        assert_eq!(put_tags.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_add_bucket_tags_keeps_existing_values() {
        let get_tags = mock!(aws_sdk_s3::Client::get_bucket_tagging).then_output(|| {
            GetBucketTaggingOutput::builder()
                .tag_set(tag("team", "ml"))
                .build()
                .unwrap()
        });
        let put_tags = mock!(aws_sdk_s3::Client::put_bucket_tagging)
            .match_requests(|req| {
                req.tagging().is_some_and(|t| {
                    t.tag_set() == [tag("owner", "ci"), tag("team", "ml")]
                })
            })
            .then_output(|| PutBucketTaggingOutput::builder().build());
        let client = S3Client::from_client(mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            [&get_tags, &put_tags]
        ));

        let tags = HashMap::from([
            ("team".to_string(), "other".to_string()),
            ("owner".to_string(), "ci".to_string()),
        ]);
        client.add_bucket_tags("data", tags, false).await.unwrap();
        assert_eq!(put_tags.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_add_bucket_tags_fails_on_other_tagging_errors() {
        let get_tags = mock!(aws_sdk_s3::Client::get_bucket_tagging)
            .then_error(|| GetBucketTaggingError::generic(service_error("AccessDenied")));
        let put_tags = mock!(aws_sdk_s3::Client::put_bucket_tagging)
            .then_output(|| PutBucketTaggingOutput::builder().build());
        let client = S3Client::from_client(mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            [&get_tags, &put_tags]
        ));

        let result = client.add_bucket_tags("data", HashMap::new(), true).await;
        assert!(matches!(result, Err(Error::Store(_))));
        assert_eq!(put_tags.num_calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_recursive_removes_listed_keys() {
        let list = mock!(aws_sdk_s3::Client::list_objects_v2)
            .match_requests(|req| req.prefix() == Some("tmp/") && req.delimiter().is_none())
            .then_output(|| listing(&["tmp/a", "tmp/nested/b"]));
        let delete = mock!(aws_sdk_s3::Client::delete_objects)
            .match_requests(|req| {
                req.delete().is_some_and(|d| {
                    d.quiet() == Some(true)
                        && d.objects().iter().map(|o| o.key()).eq(["tmp/a", "tmp/nested/b"])
                })
            })
            .then_output(|| DeleteObjectsOutput::builder().build());
        let client = S3Client::from_client(mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            [&list, &delete]
        ));

        client.delete_recursive(&S3Path::new("bucket", "tmp/")).await.unwrap();
        assert_eq!(delete.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_delete_recursive_at_bucket_root_uses_separator_prefix() {
        let list = mock!(aws_sdk_s3::Client::list_objects_v2)
            .match_requests(|req| req.prefix() == Some("/"))
            .then_output(|| listing(&[]));
        let delete = mock!(aws_sdk_s3::Client::delete_objects)
            .then_output(|| DeleteObjectsOutput::builder().build());
        let client = S3Client::from_client(mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            [&list, &delete]
        ));

        client.delete_recursive(&S3Path::new("bucket", "")).await.unwrap();
        assert_eq!(list.num_calls(), 1);
        assert_eq!(delete.num_calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_recursive_reports_per_key_failures() {
        let list = mock!(aws_sdk_s3::Client::list_objects_v2)
            .then_output(|| listing(&["logs/1", "logs/2"]));
        let delete = mock!(aws_sdk_s3::Client::delete_objects).then_output(|| {
            DeleteObjectsOutput::builder()
                .errors(
                    aws_sdk_s3::types::Error::builder()
                        .key("logs/2")
                        .code("AccessDenied")
                        .build(),
                )
                .build()
        });
        let client = S3Client::from_client(mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            [&list, &delete]
        ));

        let err = client
            .delete_recursive(&S3Path::new("bucket", "logs"))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("1 object(s)"), "{message}");
        assert!(message.contains("logs/2 (AccessDenied)"), "{message}");
    }
}
