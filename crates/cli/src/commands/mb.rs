//! mb command - Make bucket
//!
//! Creates a bucket, then optionally blocks public access, enables default
//! encryption and tags it.

use std::collections::HashMap;

use clap::Args;
use gmu_core::ObjectStore;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Create a bucket
#[derive(Args, Debug)]
pub struct MbArgs {
    /// Bucket name or s3://bucket
    pub bucket: String,

    /// Block all public access to the bucket
    #[arg(long)]
    pub block_public_access: bool,

    /// Enable default server-side encryption with the AWS managed KMS key
    #[arg(long)]
    pub encrypt: bool,

    /// Tag to add, as key=value (repeatable)
    #[arg(long = "tag", value_parser = super::tag::parse_tag)]
    pub tags: Vec<(String, String)>,
}

#[derive(Debug, Serialize)]
struct MbOutput {
    status: &'static str,
    bucket: String,
    public_access_blocked: bool,
    encrypted: bool,
    tags: usize,
}

/// Execute the mb command
pub async fn execute(args: MbArgs, store: &dyn ObjectStore, formatter: &Formatter) -> ExitCode {
    let bucket = match super::parse_bucket(&args.bucket, formatter) {
        Ok(b) => b,
        Err(code) => return code,
    };

    if let Err(e) = store.create_bucket(&bucket).await {
        return super::report(formatter, "Failed to create bucket", &e);
    }

    if args.block_public_access {
        if let Err(e) = store.block_bucket_public_access(&bucket).await {
            return super::report(formatter, "Failed to block public access", &e);
        }
    }

    if args.encrypt {
        if let Err(e) = store.bucket_server_side_encryption(&bucket).await {
            return super::report(formatter, "Failed to configure encryption", &e);
        }
    }

    let tag_count = args.tags.len();
    if !args.tags.is_empty() {
        let tags: HashMap<String, String> = args.tags.into_iter().collect();
        if let Err(e) = store.add_bucket_tags(&bucket, tags, true).await {
            return super::report(formatter, "Failed to tag bucket", &e);
        }
    }

    let record = MbOutput {
        status: "success",
        bucket,
        public_access_blocked: args.block_public_access,
        encrypted: args.encrypt,
        tags: tag_count,
    };
    formatter.done(&record, || format!("Bucket '{}' created", record.bucket));

    ExitCode::Success
}
