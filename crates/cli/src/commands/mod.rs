//! CLI command definitions and execution
//!
//! Each subcommand forwards to one `ObjectStore` operation. Commands take
//! the store as `&dyn ObjectStore` so they can run against a mock.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gmu_core::{ClientConfig, ConfigManager, Error, ObjectStore, S3Path};
use gmu_s3::S3Client;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod cat;
mod cp;
mod exists;
mod get;
mod ls;
mod mb;
mod put;
mod rb;
mod rm;
pub mod tag;

/// gmu - S3 path and object store toolkit
#[derive(Parser, Debug)]
#[command(name = "gmu")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// Configuration file (defaults to $GMU_CONFIG_DIR/config.toml)
    #[arg(long, global = true, env = "GMU_CONFIG")]
    pub config: Option<PathBuf>,

    /// Custom S3 endpoint, e.g. a MinIO server
    #[arg(long, global = true, env = "GMU_ENDPOINT")]
    pub endpoint: Option<String>,

    /// AWS region
    #[arg(long, global = true, env = "GMU_REGION")]
    pub region: Option<String>,

    /// Static access key
    #[arg(long, global = true, env = "GMU_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Static secret key
    #[arg(long, global = true, env = "GMU_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Use path-style addressing
    #[arg(long, global = true, default_value = "false")]
    pub path_style: bool,

    /// Use plain http for an endpoint given without a scheme
    #[arg(long, global = true, default_value = "false")]
    pub no_ssl: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List objects or directories under a path
    Ls(ls::LsArgs),

    /// Print object contents to stdout
    Cat(cat::CatArgs),

    /// Download an object into a local file
    Get(get::GetArgs),

    /// Upload a local file
    Put(put::PutArgs),

    /// Server-side copy between two paths
    Cp(cp::CpArgs),

    /// Remove an object, or everything under a path
    Rm(rm::RmArgs),

    /// Check whether an object exists
    Exists(exists::ExistsArgs),

    /// Create a bucket
    Mb(mb::MbArgs),

    /// Empty and remove a bucket
    Rb(rb::RbArgs),

    /// Merge tags into a bucket's tag set
    Tag(tag::TagArgs),
}

impl Cli {
    /// Output settings from the global flags
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            json: self.json,
            no_color: self.no_color,
            quiet: self.quiet,
        }
    }

    /// Client options from the config file, overridden by flags
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let manager = match &self.config {
            Some(path) => ConfigManager::with_path(path.clone()),
            None => ConfigManager::new()?,
        };
        let mut config = manager
            .load()
            .with_context(|| format!("loading {}", manager.config_path().display()))?
            .client;

        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint);
        }
        if let Some(region) = &self.region {
            config = config.with_region(region);
        }
        if let (Some(access), Some(secret)) = (&self.access_key, &self.secret_key) {
            config = config.with_credentials(access, secret);
        }
        if self.path_style {
            config = config.with_force_path_style(true);
        }
        if self.no_ssl {
            config = config.with_disable_ssl(true);
        }

        Ok(config)
    }
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let formatter = Formatter::new(cli.output_config());

    let config = match cli.client_config() {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Invalid configuration: {e:#}"));
            return ExitCode::UsageError;
        }
    };

    let client = match S3Client::new(&config).await {
        Ok(c) => c,
        Err(e) => return report(&formatter, "Failed to create S3 client", &e),
    };

    run(cli.command, &client, &formatter).await
}

/// Dispatch a parsed command against a store
pub async fn run(command: Commands, store: &dyn ObjectStore, formatter: &Formatter) -> ExitCode {
    match command {
        Commands::Ls(args) => ls::execute(args, store, formatter).await,
        Commands::Cat(args) => cat::execute(args, store, formatter).await,
        Commands::Get(args) => get::execute(args, store, formatter).await,
        Commands::Put(args) => put::execute(args, store, formatter).await,
        Commands::Cp(args) => cp::execute(args, store, formatter).await,
        Commands::Rm(args) => rm::execute(args, store, formatter).await,
        Commands::Exists(args) => exists::execute(args, store, formatter).await,
        Commands::Mb(args) => mb::execute(args, store, formatter).await,
        Commands::Rb(args) => rb::execute(args, store, formatter).await,
        Commands::Tag(args) => tag::execute(args, store, formatter).await,
    }
}

/// Parse an `s3://` argument, printing the error on failure
fn parse_uri(uri: &str, formatter: &Formatter) -> Result<S3Path, ExitCode> {
    S3Path::from_uri(uri).map_err(|e| {
        formatter.error(&e.to_string());
        ExitCode::UsageError
    })
}

/// Accept a bare bucket name or an `s3://bucket` URI
fn parse_bucket(target: &str, formatter: &Formatter) -> Result<String, ExitCode> {
    let bucket = if target.contains("://") {
        parse_uri(target, formatter)?.bucket
    } else {
        target.trim_matches('/').to_string()
    };

    if bucket.is_empty() {
        formatter.error("Bucket name cannot be empty");
        return Err(ExitCode::UsageError);
    }
    Ok(bucket)
}

/// Print a failed operation and pick its exit code
fn report(formatter: &Formatter, context: &str, err: &Error) -> ExitCode {
    formatter.error(&format!("{context}: {err}"));
    ExitCode::from(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bucket_forms() {
        let formatter = Formatter::default();
        assert_eq!(parse_bucket("data", &formatter).unwrap(), "data");
        assert_eq!(parse_bucket("data/", &formatter).unwrap(), "data");
        assert_eq!(parse_bucket("s3://data/ignored", &formatter).unwrap(), "data");
        assert_eq!(parse_bucket("", &formatter), Err(ExitCode::UsageError));
        assert_eq!(parse_bucket("gs://data", &formatter), Err(ExitCode::UsageError));
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from([
            "gmu",
            "--json",
            "--endpoint",
            "localhost:9000",
            "--no-ssl",
            "ls",
            "s3://bucket/dir",
        ])
        .unwrap();

        assert!(cli.json);
        assert!(cli.no_ssl);
        assert_eq!(cli.endpoint.as_deref(), Some("localhost:9000"));
        assert!(matches!(cli.command, Commands::Ls(_)));
    }

    #[test]
    fn test_client_config_overrides_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "schema_version = 1\n[client]\nregion = \"eu-west-1\"\nendpoint = \"minio:9000\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "gmu",
            "--config",
            path.to_str().unwrap(),
            "--region",
            "ap-south-1",
            "--path-style",
            "exists",
            "s3://bucket/key",
        ])
        .unwrap();

        let config = cli.client_config().unwrap();
        assert_eq!(config.region, "ap-south-1");
        assert_eq!(config.endpoint.as_deref(), Some("minio:9000"));
        assert!(config.force_path_style);
    }
}
