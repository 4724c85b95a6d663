//! Log output for hosts that build outcome reports.
//!
//! The engine and the sources only emit `tracing` events. A host calls
//! [`init_tracing`] once, usually with [`LogSettings::from_env`], to decide
//! where those events go.

use std::str::FromStr;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ReportError, ReportResult};

const FORMAT_VAR: &str = "OUTCOMES_LOG_FORMAT";
const FILTER_VAR: &str = "OUTCOMES_LOG";
const DEFAULT_DIRECTIVES: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Newline-delimited JSON, one object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> ReportResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ReportError::LogSettings(format!(
                "{FORMAT_VAR} must be 'text' or 'json', got '{other}'"
            ))),
        }
    }
}

/// Output format and filter directives for the global subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub format: LogFormat,
    /// `EnvFilter` directives, e.g. `outcome_engine=debug,info`.
    pub directives: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            directives: DEFAULT_DIRECTIVES.to_string(),
        }
    }
}

impl LogSettings {
    pub fn new(format: LogFormat, directives: impl Into<String>) -> Self {
        Self {
            format,
            directives: directives.into(),
        }
    }

    /// Settings from the environment.
    ///
    /// Reads:
    /// - OUTCOMES_LOG_FORMAT (optional, `text` or `json`, default: text)
    /// - OUTCOMES_LOG (optional, filter directives; falls back to RUST_LOG,
    ///   then `info`)
    pub fn from_env() -> ReportResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ReportResult<Self> {
        let format = match lookup(FORMAT_VAR) {
            Some(v) => v.parse()?,
            None => LogFormat::default(),
        };
        let directives = lookup(FILTER_VAR)
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string());
        let settings = Self { format, directives };
        settings.env_filter()?;
        Ok(settings)
    }

    pub fn env_filter(&self) -> ReportResult<EnvFilter> {
        EnvFilter::try_new(&self.directives).map_err(|e| {
            ReportError::LogSettings(format!("{FILTER_VAR} '{}': {e}", self.directives))
        })
    }
}

/// Install the global subscriber described by `settings`.
///
/// Returns `Ok(false)` when a global subscriber was already installed, in
/// which case `settings` has no effect.
pub fn init_tracing(settings: &LogSettings) -> ReportResult<bool> {
    let filter = settings.env_filter()?;
    let installed = match settings.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
            .is_ok(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
            .is_ok(),
    };
    if installed {
        tracing::debug!(
            format = ?settings.format,
            directives = %settings.directives,
            "outcome report logging initialised"
        );
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |k| vars.get(k).map(|v| v.to_string())
    }

    #[test]
    fn test_defaults_without_vars() {
        let settings = LogSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, LogSettings::default());
    }

    #[test]
    fn test_json_format_and_project_filter() {
        let settings = LogSettings::from_lookup(lookup(&[
            ("OUTCOMES_LOG_FORMAT", " JSON "),
            ("OUTCOMES_LOG", "outcome_engine=debug,warn"),
            ("RUST_LOG", "trace"),
        ]))
        .unwrap();
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.directives, "outcome_engine=debug,warn");
    }

    #[test]
    fn test_rust_log_fallback() {
        let settings = LogSettings::from_lookup(lookup(&[("RUST_LOG", "debug")])).unwrap();
        assert_eq!(settings.directives, "debug");
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = LogSettings::from_lookup(lookup(&[("OUTCOMES_LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, ReportError::LogSettings(ref m) if m.contains("xml")));
    }

    #[test]
    fn test_bad_directives_rejected() {
        let err = LogSettings::from_lookup(lookup(&[("OUTCOMES_LOG", "outcome_engine=loud")]))
            .unwrap_err();
        assert!(err.to_string().contains("OUTCOMES_LOG"));
    }
}
