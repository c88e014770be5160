//! cat command - Display object contents

use std::io::Write;

use clap::Args;
use gmu_core::ObjectStore;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Print object contents to stdout
#[derive(Args, Debug)]
pub struct CatArgs {
    /// Object to print (s3://bucket/key)
    pub path: String,
}

/// Execute the cat command
pub async fn execute(args: CatArgs, store: &dyn ObjectStore, formatter: &Formatter) -> ExitCode {
    let path = match super::parse_uri(&args.path, formatter) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let data = match store.download(&path).await {
        Ok(data) => data,
        Err(e) => return super::report(formatter, "Failed to download object", &e),
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(&data).and_then(|()| stdout.flush()) {
        formatter.error(&format!("Failed to write output: {e}"));
        return ExitCode::GeneralError;
    }

    ExitCode::Success
}
