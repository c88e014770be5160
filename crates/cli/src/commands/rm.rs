//! rm command - Remove objects
//!
//! Removes a single object, or with `--recursive` every object under the
//! path treated as a directory. A bucket root is never a valid target.

use clap::Args;
use gmu_core::ObjectStore;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Remove objects
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Object or prefix to remove (s3://bucket/key)
    pub path: String,

    /// Remove everything under the path
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    status: &'static str,
    path: String,
    recursive: bool,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, store: &dyn ObjectStore, formatter: &Formatter) -> ExitCode {
    let path = match super::parse_uri(&args.path, formatter) {
        Ok(p) => p,
        Err(code) => return code,
    };

    if path.key.trim_matches('/').is_empty() {
        formatter.error(&format!(
            "Refusing to remove the root of bucket '{}'; use `gmu rb` to empty and remove it",
            path.bucket
        ));
        return ExitCode::UsageError;
    }

    let result = if args.recursive {
        store.delete_recursive(&path).await
    } else {
        store.delete_object(&path).await
    };

    if let Err(e) = result {
        return super::report(formatter, "Failed to remove", &e);
    }

    let record = RmOutput {
        status: "success",
        path: path.to_uri(),
        recursive: args.recursive,
    };
    formatter.done(&record, || format!("Removed {}", record.path));

    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use gmu_core::{MockObjectStore, S3Path};

    #[tokio::test]
    async fn test_rm_single_object() {
        let mut store = MockObjectStore::new();
        store.expect_delete_recursive().never();
        store
            .expect_delete_object()
            .withf(|p| p == &S3Path::new("bucket", "tmp/file"))
            .times(1)
            .returning(|_| Ok(()));

        let args = RmArgs {
            path: "s3://bucket/tmp/file".into(),
            recursive: false,
        };
        assert_eq!(execute(args, &store, &Formatter::default()).await, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_rm_recursive() {
        let mut store = MockObjectStore::new();
        store.expect_delete_object().never();
        store
            .expect_delete_recursive()
            .withf(|p| p == &S3Path::new("bucket", "tmp/"))
            .times(1)
            .returning(|_| Ok(()));

        let args = RmArgs {
            path: "s3://bucket/tmp/".into(),
            recursive: true,
        };
        assert_eq!(execute(args, &store, &Formatter::default()).await, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_rm_refuses_bucket_root() {
        for (path, recursive) in [
            ("s3://bucket", false),
            ("s3://bucket", true),
            ("s3://bucket/", true),
        ] {
            let mut store = MockObjectStore::new();
            store.expect_delete_object().never();
            store.expect_delete_recursive().never();

            let args = RmArgs {
                path: path.into(),
                recursive,
            };
            assert_eq!(
                execute(args, &store, &Formatter::default()).await,
                ExitCode::UsageError,
                "{path} recursive={recursive}"
            );
        }
    }
}
