//! Result and error reporting for gmu commands
//!
//! Every command produces one record per invocation. In JSON mode that
//! record is printed as pretty JSON on stdout; otherwise the command's
//! human line is printed instead. Errors always go to stderr.

use serde::Serialize;

use super::OutputConfig;

const OK_MARK: &str = "✓";
const ERR_MARK: &str = "✗";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// How a finished command reports back to the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Plain,
    Color,
    Json,
}

/// Writes command records and errors in the selected style
#[derive(Debug, Clone)]
pub struct Formatter {
    style: Style,
    quiet: bool,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        let style = if config.json {
            Style::Json
        } else if config.no_color {
            Style::Plain
        } else {
            Style::Color
        };
        Self {
            style,
            quiet: config.quiet,
        }
    }

    /// Print `record` as JSON, or the text built by `human`
    pub fn emit<T: Serialize>(&self, record: &T, human: impl FnOnce() -> String) {
        if let Some(out) = self.render(record, human) {
            println!("{out}");
        }
    }

    /// Like [`Formatter::emit`], with the human text marked as a completed action
    pub fn done<T: Serialize>(&self, record: &T, message: impl FnOnce() -> String) {
        let style = self.style;
        self.emit(record, || match style {
            Style::Color => format!("{GREEN}{OK_MARK}{RESET} {}", message()),
            _ => format!("{OK_MARK} {}", message()),
        });
    }

    /// Print an error. Quiet mode does not silence errors.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.render_error(message));
    }

    fn render<T: Serialize>(&self, record: &T, human: impl FnOnce() -> String) -> Option<String> {
        if self.quiet {
            return None;
        }
        match self.style {
            Style::Json => match serde_json::to_string_pretty(record) {
                Ok(json) => Some(json),
                Err(e) => {
                    tracing::warn!(error = %e, "unable to serialize command output");
                    None
                }
            },
            Style::Plain | Style::Color => {
                let text = human();
                (!text.is_empty()).then_some(text)
            }
        }
    }

    fn render_error(&self, message: &str) -> String {
        match self.style {
            Style::Json => serde_json::json!({ "error": message }).to_string(),
            Style::Color => format!("{RED}{ERR_MARK}{RESET} {message}"),
            Style::Plain => format!("{ERR_MARK} {message}"),
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Record {
        bucket: &'static str,
    }

    fn formatter(json: bool, no_color: bool, quiet: bool) -> Formatter {
        Formatter::new(OutputConfig {
            json,
            no_color,
            quiet,
        })
    }

    #[test]
    fn test_json_mode_renders_record() {
        let out = formatter(true, false, false).render(&Record { bucket: "data" }, || {
            unreachable!("human text is not built in json mode")
        });
        let value: serde_json::Value = serde_json::from_str(&out.unwrap()).unwrap();
        assert_eq!(value["bucket"], "data");
    }

    #[test]
    fn test_human_mode_renders_text() {
        let out = formatter(false, true, false).render(&Record { bucket: "data" }, || {
            "s3://data".to_string()
        });
        assert_eq!(out.as_deref(), Some("s3://data"));
    }

    #[test]
    fn test_empty_human_text_prints_nothing() {
        let out = formatter(false, true, false).render(&Record { bucket: "data" }, String::new);
        assert_eq!(out, None);
    }

    #[test]
    fn test_quiet_suppresses_records() {
        let f = formatter(true, false, true);
        assert_eq!(f.render(&Record { bucket: "data" }, String::new), None);
        assert!(f.render_error("boom").contains("boom"));
    }

    #[test]
    fn test_error_styles() {
        let json: serde_json::Value =
            serde_json::from_str(&formatter(true, false, false).render_error("boom")).unwrap();
        assert_eq!(json["error"], "boom");

        assert_eq!(formatter(false, true, false).render_error("boom"), "✗ boom");
        assert!(formatter(false, false, false).render_error("boom").contains(RED));
    }
}
