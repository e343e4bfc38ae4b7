//! Telemetry: record formatting and tracing-subscriber wiring.
//!
//! [`TelemetryFormatter`] renders [`SignalRecord`]s for human-facing taps,
//! and [`TelemetryConfig`] installs the global tracing subscriber from
//! environment configuration. The dispatch core itself only emits through
//! `tracing`; nothing here is required for dispatch to work.

use std::io::IsTerminal;

use miette::IntoDiagnostic;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::taps::SignalRecord;

pub const KIND_COLOR: &str = "\x1b[32m"; // green
pub const LABEL_COLOR: &str = "\x1b[35m"; // magenta
pub const RESET_COLOR: &str = "\x1b[0m";

/// Filter directives used when neither config nor `RUST_LOG` provide any.
pub const DEFAULT_FILTER: &str = "info";

/// Formatter color mode for telemetry output.
///
/// - [`FormatterMode::Auto`]: detects TTY capability via `stderr.is_terminal()`
/// - [`FormatterMode::Colored`]: always include ANSI color codes
/// - [`FormatterMode::Plain`]: never include color codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatterMode {
    #[default]
    Auto,
    Colored,
    Plain,
}

impl FormatterMode {
    /// Auto-detect based on stderr TTY capability.
    pub fn auto_detect() -> Self {
        if std::io::stderr().is_terminal() {
            FormatterMode::Colored
        } else {
            FormatterMode::Plain
        }
    }

    /// Returns true if this mode should use colored output.
    ///
    /// For `Auto`, performs TTY detection on each call.
    pub fn is_colored(&self) -> bool {
        match self {
            FormatterMode::Auto => std::io::stderr().is_terminal(),
            FormatterMode::Colored => true,
            FormatterMode::Plain => false,
        }
    }
}

/// Renders signal records into display lines for human-facing taps.
pub trait TelemetryFormatter: Send + Sync {
    fn render(&self, record: &SignalRecord) -> String;
}

/// Plain text formatter with optional ANSI color accents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter {
    mode: FormatterMode,
}

impl PlainFormatter {
    /// Formatter in `Auto` mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Formatter with an explicit color mode.
    pub fn with_mode(mode: FormatterMode) -> Self {
        Self { mode }
    }
}

impl TelemetryFormatter for PlainFormatter {
    fn render(&self, record: &SignalRecord) -> String {
        let time = record.at.format("%H:%M:%S%.3f");
        let label = record.label.as_deref().unwrap_or("-");
        if self.mode.is_colored() {
            format!(
                "{time} {KIND_COLOR}{kind:>6}{RESET_COLOR} {LABEL_COLOR}{label}{RESET_COLOR}",
                kind = record.kind
            )
        } else {
            format!("{time} {kind:>6} {label}", kind = record.kind)
        }
    }
}

// ============================================================================
// Environment-driven configuration
// ============================================================================

/// Subscriber configuration resolved from the process environment.
///
/// Reads, after loading any `.env` file:
/// - `STATECRAFT_LOG`: tracing filter directives (falls back to `RUST_LOG`,
///   then [`DEFAULT_FILTER`])
/// - `STATECRAFT_COLOR`: `auto` | `always` | `never`
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub formatter: FormatterMode,
    pub filter: Option<String>,
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let formatter = std::env::var("STATECRAFT_COLOR")
            .ok()
            .and_then(|raw| parse_mode(&raw))
            .unwrap_or_default();
        let filter = std::env::var("STATECRAFT_LOG").ok();
        Self { formatter, filter }
    }

    #[must_use]
    pub fn with_filter(mut self, directives: impl Into<String>) -> Self {
        self.filter = Some(directives.into());
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, mode: FormatterMode) -> Self {
        self.formatter = mode;
        self
    }

    /// Install the global tracing subscriber described by this config.
    ///
    /// Fails when the filter directives do not parse or a global
    /// subscriber is already installed.
    pub fn install(self) -> miette::Result<()> {
        let filter = match &self.filter {
            Some(directives) => EnvFilter::try_new(directives).into_diagnostic()?,
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        };
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(self.formatter.is_colored()),
            )
            .with(filter)
            .with(ErrorLayer::default())
            .try_init()
            .into_diagnostic()?;
        Ok(())
    }
}

fn parse_mode(raw: &str) -> Option<FormatterMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "auto" => Some(FormatterMode::Auto),
        "always" | "colored" | "on" => Some(FormatterMode::Colored),
        "never" | "plain" | "off" => Some(FormatterMode::Plain),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalKind;
    use chrono::Utc;

    fn record(kind: SignalKind, label: Option<&str>) -> SignalRecord {
        SignalRecord {
            kind,
            label: label.map(str::to_owned),
            at: Utc::now(),
        }
    }

    #[test]
    fn parse_mode_accepts_common_spellings() {
        assert_eq!(parse_mode("auto"), Some(FormatterMode::Auto));
        assert_eq!(parse_mode("ALWAYS"), Some(FormatterMode::Colored));
        assert_eq!(parse_mode(" never "), Some(FormatterMode::Plain));
        assert_eq!(parse_mode("sometimes"), None);
    }

    #[test]
    fn explicit_modes_ignore_tty() {
        assert!(FormatterMode::Colored.is_colored());
        assert!(!FormatterMode::Plain.is_colored());
    }

    #[test]
    fn plain_render_carries_kind_and_label() {
        let formatter = PlainFormatter::with_mode(FormatterMode::Plain);
        let line = formatter.render(&record(SignalKind::Event, Some("counter")));
        assert!(line.contains("event"));
        assert!(line.contains("counter"));
        assert!(!line.contains(RESET_COLOR));
    }

    #[test]
    fn colored_render_wraps_with_ansi() {
        let formatter = PlainFormatter::with_mode(FormatterMode::Colored);
        let line = formatter.render(&record(SignalKind::Update, None));
        assert!(line.contains(KIND_COLOR));
        assert!(line.contains(RESET_COLOR));
        assert!(line.contains('-'));
    }

    #[test]
    fn config_builders_override_env_defaults() {
        let config = TelemetryConfig::default()
            .with_filter("statecraft=debug")
            .with_formatter(FormatterMode::Plain);
        assert_eq!(config.filter.as_deref(), Some("statecraft=debug"));
        assert_eq!(config.formatter, FormatterMode::Plain);
    }
}
