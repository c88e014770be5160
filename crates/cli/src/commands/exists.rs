//! exists command - Check object existence
//!
//! Exits 0 when the object is present and 5 when it is not.

use clap::Args;
use gmu_core::ObjectStore;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Check whether an object exists
#[derive(Args, Debug)]
pub struct ExistsArgs {
    /// Object to probe (s3://bucket/key)
    pub path: String,
}

#[derive(Debug, Serialize)]
struct ExistsOutput {
    path: String,
    exists: bool,
}

/// Execute the exists command
pub async fn execute(args: ExistsArgs, store: &dyn ObjectStore, formatter: &Formatter) -> ExitCode {
    let path = match super::parse_uri(&args.path, formatter) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let exists = match store.exists(&path).await {
        Ok(exists) => exists,
        Err(e) => return super::report(formatter, "Failed to check object", &e),
    };

    let record = ExistsOutput {
        path: path.to_uri(),
        exists,
    };
    formatter.emit(&record, || {
        if exists {
            format!("{path} exists")
        } else {
            format!("{path} does not exist")
        }
    });

    if exists {
        ExitCode::Success
    } else {
        ExitCode::NotFound
    }
}
