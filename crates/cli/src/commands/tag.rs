//! tag command - Merge tags into a bucket's tag set

use std::collections::HashMap;

use clap::Args;
use gmu_core::ObjectStore;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Merge tags into a bucket's tag set
#[derive(Args, Debug)]
pub struct TagArgs {
    /// Bucket name or s3://bucket
    pub bucket: String,

    /// Tags as key=value
    #[arg(required = true, value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,

    /// Replace existing values for the same keys
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Debug, Serialize)]
struct TagOutput {
    status: &'static str,
    bucket: String,
    tags: HashMap<String, String>,
}

/// Parse a `key=value` tag argument
pub fn parse_tag(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("Invalid tag '{s}'. Expected key=value")),
    }
}

/// Execute the tag command
pub async fn execute(args: TagArgs, store: &dyn ObjectStore, formatter: &Formatter) -> ExitCode {
    let bucket = match super::parse_bucket(&args.bucket, formatter) {
        Ok(b) => b,
        Err(code) => return code,
    };

    let tags: HashMap<String, String> = args.tags.into_iter().collect();

    if let Err(e) = store
        .add_bucket_tags(&bucket, tags.clone(), args.overwrite)
        .await
    {
        return super::report(formatter, "Failed to tag bucket", &e);
    }

    let record = TagOutput {
        status: "success",
        bucket,
        tags,
    };
    formatter.done(&record, || {
        format!("Tagged bucket '{}' with {} tag(s)", record.bucket, record.tags.len())
    });

    ExitCode::Success
}
