//! get command - Download an object into a local file

use std::path::PathBuf;

use clap::Args;
use gmu_core::ObjectStore;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Download an object into a local file
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Object to download (s3://bucket/key)
    pub source: String,

    /// Local destination file (created or truncated)
    pub target: PathBuf,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    status: &'static str,
    source: String,
    target: String,
    size_bytes: u64,
}

/// Execute the get command
pub async fn execute(args: GetArgs, store: &dyn ObjectStore, formatter: &Formatter) -> ExitCode {
    let source = match super::parse_uri(&args.source, formatter) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let mut file = match tokio::fs::File::create(&args.target).await {
        Ok(f) => f,
        Err(e) => {
            formatter.error(&format!(
                "Failed to create '{}': {e}",
                args.target.display()
            ));
            return ExitCode::GeneralError;
        }
    };

    let size = match store.download_to_file(&source, &mut file).await {
        Ok(n) => n,
        Err(e) => return super::report(formatter, "Failed to download object", &e),
    };

    let record = GetOutput {
        status: "success",
        source: source.to_uri(),
        target: args.target.display().to_string(),
        size_bytes: size,
    };
    formatter.done(&record, || {
        format!("{} -> {} ({size} bytes)", record.source, record.target)
    });

    ExitCode::Success
}
