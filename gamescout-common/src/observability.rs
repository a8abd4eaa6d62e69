//! Logging setup for the `gamescout` binary.
//!
//! Events go to a daily rolling file through a non-blocking writer, and
//! optionally to stderr as well. Nothing is ever written to stdout: the
//! interactive session owns it.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the file writer flushing for the life of the process.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const APP_NAME: &str = "gamescout";
const LOG_DIR_ENV: &str = "GAMESCOUT_LOG_DIR";

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory for the log files. If `None`, `GAMESCOUT_LOG_DIR` is
    /// consulted, then `~/.local/share/gamescout`.
    pub log_dir: Option<PathBuf>,
    /// Mirror every event to stderr.
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

/// Install the global `tracing` subscriber and return today's log file path.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    let dir = resolve_log_dir(config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, log_prefix()));

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let json = config.format == LogFormat::Json;
    let (file_text, file_json) = if json {
        (None, Some(fmt::layer().json().with_writer(writer)))
    } else {
        (Some(fmt::layer().with_writer(writer).with_ansi(false)), None)
    };
    let stderr_text =
        (config.emit_stderr && !json).then(|| fmt::layer().with_writer(std::io::stderr));
    let stderr_json =
        (config.emit_stderr && json).then(|| fmt::layer().json().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_text)
        .with(file_json)
        .with(stderr_text)
        .with(stderr_json)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let _ = LOG_GUARD.set(guard);
    Ok(dated_log_path(&dir, Local::now().date_naive()))
}

fn log_prefix() -> String {
    format!("{APP_NAME}.log")
}

/// The name `rolling::daily` gives the file for `day`.
fn dated_log_path(dir: &Path, day: NaiveDate) -> PathBuf {
    dir.join(format!("{}.{}", log_prefix(), day.format("%Y-%m-%d")))
}

fn resolve_log_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return expand_home(dir);
    }

    if let Ok(env_dir) = std::env::var(LOG_DIR_ENV) {
        return expand_home(Path::new(&env_dir));
    }

    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".local").join("share").join(APP_NAME),
        Err(_) => PathBuf::from(".").join(APP_NAME),
    }
}

fn expand_home(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let got = resolve_log_dir(Some(tmp.path()));
        assert_eq!(got, tmp.path());
    }

    #[test]
    fn tilde_is_expanded_against_home() {
        let Ok(home) = std::env::var("HOME") else {
            return;
        };
        let got = expand_home(Path::new("~/logs/gamescout"));
        assert_eq!(got, PathBuf::from(home).join("logs/gamescout"));
    }

    #[test]
    fn non_tilde_paths_are_untouched() {
        let got = expand_home(Path::new("/var/log/gamescout"));
        assert_eq!(got, PathBuf::from("/var/log/gamescout"));
    }

    #[test]
    fn log_path_follows_daily_rollover_naming() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let got = dated_log_path(Path::new("/tmp/gs"), day);
        assert_eq!(got, PathBuf::from("/tmp/gs/gamescout.log.2024-03-09"));
    }

    // The only test in this crate that installs the global subscriber.
    #[test]
    fn init_creates_the_directory_and_installs_once() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("logs");

        let path = init_logging(LogConfig {
            log_dir: Some(dir.clone()),
            emit_stderr: true,
            format: LogFormat::Json,
            ..LogConfig::default()
        })
        .unwrap();
        assert!(dir.is_dir());
        assert_eq!(path.parent(), Some(dir.as_path()));

        let again = init_logging(LogConfig {
            log_dir: Some(dir),
            ..LogConfig::default()
        });
        assert!(again.is_err());
    }

    #[test]
    fn log_format_reads_lowercase_names() {
        let fmt: LogFormat = parse_format("json");
        assert_eq!(fmt, LogFormat::Json);
        let fmt: LogFormat = parse_format("text");
        assert_eq!(fmt, LogFormat::Text);
    }

    fn parse_format(name: &str) -> LogFormat {
        use serde::de::value::{Error, StrDeserializer};
        use serde::de::IntoDeserializer;
        let de: StrDeserializer<'_, Error> = name.into_deserializer();
        LogFormat::deserialize(de).unwrap()
    }
}
