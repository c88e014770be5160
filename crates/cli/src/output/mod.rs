//! Command output

mod formatter;

pub use formatter::Formatter;

/// Output flags shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Print one JSON record per command
    pub json: bool,
    /// Plain text without ANSI colors
    pub no_color: bool,
    /// Only errors are printed
    pub quiet: bool,
}
