//! rb command - Remove bucket
//!
//! Deletes every object in the bucket, then the bucket itself.

use clap::Args;
use gmu_core::ObjectStore;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Empty and remove a bucket
#[derive(Args, Debug)]
pub struct RbArgs {
    /// Bucket name or s3://bucket
    pub bucket: String,
}

#[derive(Debug, Serialize)]
struct RbOutput {
    status: &'static str,
    bucket: String,
}

/// Execute the rb command
pub async fn execute(args: RbArgs, store: &dyn ObjectStore, formatter: &Formatter) -> ExitCode {
    let bucket = match super::parse_bucket(&args.bucket, formatter) {
        Ok(b) => b,
        Err(code) => return code,
    };

    if let Err(e) = store.delete_bucket(&bucket).await {
        return super::report(formatter, "Failed to remove bucket", &e);
    }

    let record = RbOutput {
        status: "success",
        bucket,
    };
    formatter.done(&record, || format!("Bucket '{}' removed", record.bucket));

    ExitCode::Success
}
