//! put command - Upload a local file

use std::path::PathBuf;

use clap::Args;
use gmu_core::ObjectStore;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Upload a local file
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file to upload
    pub source: PathBuf,

    /// Destination (s3://bucket/key). A trailing `/` appends the file name.
    pub target: String,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    status: &'static str,
    source: String,
    target: String,
    size_bytes: usize,
}

/// Execute the put command
pub async fn execute(args: PutArgs, store: &dyn ObjectStore, formatter: &Formatter) -> ExitCode {
    let mut target = match super::parse_uri(&args.target, formatter) {
        Ok(p) => p,
        Err(code) => return code,
    };

    if target.key.is_empty() || target.key.ends_with('/') {
        if let Some(name) = args.source.file_name().and_then(|n| n.to_str()) {
            target = target.append(name);
        }
    }

    let data = match tokio::fs::read(&args.source).await {
        Ok(data) => data,
        Err(e) => {
            formatter.error(&format!("Failed to read '{}': {e}", args.source.display()));
            return ExitCode::GeneralError;
        }
    };
    let size = data.len();

    if let Err(e) = store.upload(data, &target).await {
        return super::report(formatter, "Failed to upload object", &e);
    }

    let record = PutOutput {
        status: "success",
        source: args.source.display().to_string(),
        target: target.to_uri(),
        size_bytes: size,
    };
    formatter.done(&record, || {
        format!("{} -> {} ({size} bytes)", record.source, record.target)
    });

    ExitCode::Success
}
