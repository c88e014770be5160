//! ls command - List objects or directories
//!
//! Lists one level below the given path, using `/` as the delimiter.

use clap::Args;
use gmu_core::{ObjectStore, S3Path};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// List objects under a path
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Path to list (s3://bucket[/prefix])
    pub path: String,

    /// List common prefixes (directories) instead of objects
    #[arg(short, long)]
    pub dirs: bool,
}

#[derive(Debug, Serialize)]
struct LsOutput<'a> {
    items: &'a [LsItem],
}

#[derive(Debug, Serialize)]
struct LsItem {
    uri: String,
    #[serde(flatten)]
    path: S3Path,
}

/// Execute the ls command
pub async fn execute(args: LsArgs, store: &dyn ObjectStore, formatter: &Formatter) -> ExitCode {
    let path = match super::parse_uri(&args.path, formatter) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let listed = if args.dirs {
        store.list_directories(&path).await
    } else {
        store.list(&path).await
    };

    let paths = match listed {
        Ok(paths) => paths,
        Err(e) => return super::report(formatter, "Failed to list objects", &e),
    };

    let items: Vec<LsItem> = paths
        .into_iter()
        .map(|path| LsItem {
            uri: path.to_uri(),
            path,
        })
        .collect();
    let lines = || {
        items
            .iter()
            .map(|item| item.uri.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    };
    formatter.emit(&LsOutput { items: &items }, lines);

    ExitCode::Success
}
