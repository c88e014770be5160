//! cp command - Server-side copy

use clap::Args;
use gmu_core::ObjectStore;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Copy an object to another path
#[derive(Args, Debug)]
pub struct CpArgs {
    /// Source object (s3://bucket/key)
    pub source: String,

    /// Destination object (s3://bucket/key)
    pub target: String,
}

#[derive(Debug, Serialize)]
struct CpOutput {
    status: &'static str,
    source: String,
    target: String,
}

/// Execute the cp command
pub async fn execute(args: CpArgs, store: &dyn ObjectStore, formatter: &Formatter) -> ExitCode {
    let source = match super::parse_uri(&args.source, formatter) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let target = match super::parse_uri(&args.target, formatter) {
        Ok(p) => p,
        Err(code) => return code,
    };

    if let Err(e) = store.copy(&source, &target).await {
        return super::report(formatter, "Failed to copy object", &e);
    }

    let record = CpOutput {
        status: "success",
        source: source.to_uri(),
        target: target.to_uri(),
    };
    formatter.done(&record, || format!("{} -> {}", record.source, record.target));

    ExitCode::Success
}
