//! Process-wide `tracing` setup for binaries embedding the library.
//!
//! Renders go to stdout, so logs never do: they land on stderr or in a
//! JSON Lines file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, Layer};

use crate::errors::ResearchError;

const ENV_ENABLED: &str = "RESEARCH_OBSERVABILITY_ENABLED";
const ENV_LOG_LEVEL: &str = "RESEARCH_LOG_LEVEL";
const ENV_JSON_LOG_PATH: &str = "RESEARCH_JSON_LOG_PATH";
const DEFAULT_FILTER: &str = "warn";

static INIT: OnceCell<LogTarget> = OnceCell::new();

/// Where log records are written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogTarget {
    Disabled,
    /// Compact lines on stderr.
    Console,
    /// One JSON object per line, appended to this file.
    JsonFile(PathBuf),
}

impl LogTarget {
    /// Reads the target from `RESEARCH_OBSERVABILITY_ENABLED` and
    /// `RESEARCH_JSON_LOG_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Unrecognised flag values keep logging on.
        let enabled = lookup(ENV_ENABLED)
            .and_then(|value| parse_flag(&value))
            .unwrap_or(true);
        if !enabled {
            return Self::Disabled;
        }
        match lookup(ENV_JSON_LOG_PATH).filter(|path| !path.trim().is_empty()) {
            Some(path) => Self::JsonFile(PathBuf::from(path)),
            None => Self::Console,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

/// `RESEARCH_LOG_LEVEL` wins over `RUST_LOG`; a directive that fails to
/// parse is ignored.
fn resolve_filter(lookup: impl Fn(&str) -> Option<String>) -> EnvFilter {
    [ENV_LOG_LEVEL, EnvFilter::DEFAULT_ENV]
        .into_iter()
        .filter_map(|key| lookup(key))
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Splits a log path into directory and file name, creating the directory.
fn prepare_log_file(path: &Path) -> Result<(PathBuf, OsString), ResearchError> {
    let file_name = path.file_name().ok_or_else(|| {
        ResearchError::Config(format!("log path has no file name: {}", path.display()))
    })?;
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .map_err(|e| ResearchError::Io(format!("{}: {e}", dir.display())))?;
    Ok((dir.to_path_buf(), file_name.to_os_string()))
}

fn console_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
}

/// Installs the global subscriber once per process and returns the target
/// in effect.
///
/// Environment variables:
/// - `RESEARCH_OBSERVABILITY_ENABLED`: `false`/`off`/`0` disables logging.
/// - `RESEARCH_LOG_LEVEL`, then `RUST_LOG`: filter directives (default `warn`).
/// - `RESEARCH_JSON_LOG_PATH`: JSONL log file. Each record carries the
///   `research_run` span fields (`trace_id`, `agent`).
///
/// When the log file's directory cannot be created, logs fall back to the
/// console and the failure is reported as the first warning.
pub fn init_observability() -> &'static LogTarget {
    INIT.get_or_init(|| install(LogTarget::from_env()))
}

fn install(target: LogTarget) -> LogTarget {
    let filter = resolve_filter(|key| std::env::var(key).ok());
    match target {
        LogTarget::Disabled => LogTarget::Disabled,
        LogTarget::Console => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(console_layer())
                .try_init();
            LogTarget::Console
        }
        LogTarget::JsonFile(path) => match prepare_log_file(&path) {
            Ok((dir, file_name)) => {
                let json_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(false)
                    .with_writer(tracing_appender::rolling::never(dir, file_name));
                let _ = tracing_subscriber::registry()
                    .with(filter)
                    .with(json_layer)
                    .try_init();
                LogTarget::JsonFile(path)
            }
            Err(err) => {
                let installed = tracing_subscriber::registry()
                    .with(filter)
                    .with(console_layer())
                    .try_init()
                    .is_ok();
                if installed {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "json log unavailable; logging to stderr"
                    );
                }
                LogTarget::Console
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tracing::level_filters::LevelFilter;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag(" Yes "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn target_defaults_to_console_and_honours_the_switch() {
        assert_eq!(LogTarget::from_lookup(lookup(&[])), LogTarget::Console);
        assert_eq!(
            LogTarget::from_lookup(lookup(&[(ENV_ENABLED, "off")])),
            LogTarget::Disabled
        );
        assert_eq!(
            LogTarget::from_lookup(lookup(&[(ENV_ENABLED, "sometimes")])),
            LogTarget::Console
        );
    }

    #[test]
    fn json_path_selects_file_target_unless_blank() {
        assert_eq!(
            LogTarget::from_lookup(lookup(&[(ENV_JSON_LOG_PATH, "logs/run.jsonl")])),
            LogTarget::JsonFile(PathBuf::from("logs/run.jsonl"))
        );
        assert_eq!(
            LogTarget::from_lookup(lookup(&[(ENV_JSON_LOG_PATH, "  ")])),
            LogTarget::Console
        );
        assert_eq!(
            LogTarget::from_lookup(lookup(&[
                (ENV_ENABLED, "0"),
                (ENV_JSON_LOG_PATH, "logs/run.jsonl"),
            ])),
            LogTarget::Disabled
        );
    }

    #[test]
    fn research_level_takes_precedence_over_rust_log() {
        let filter = resolve_filter(lookup(&[(ENV_LOG_LEVEL, "debug"), ("RUST_LOG", "error")]));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = resolve_filter(lookup(&[("RUST_LOG", "error")]));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));

        let filter = resolve_filter(lookup(&[]));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn unparsable_level_falls_through() {
        let filter = resolve_filter(lookup(&[
            (ENV_LOG_LEVEL, "research_stream=loudest"),
            ("RUST_LOG", "info"),
        ]));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn log_file_directory_is_created() {
        let root = tempfile::tempdir().expect("tempdir");
        let path = root.path().join("nested/logs/research.jsonl");
        let (dir, file_name) = prepare_log_file(&path).expect("prepare");
        assert_eq!(dir, root.path().join("nested/logs"));
        assert_eq!(file_name, OsString::from("research.jsonl"));
        assert!(dir.is_dir());
    }

    #[test]
    fn bare_file_name_logs_into_current_directory() {
        let (dir, file_name) = prepare_log_file(Path::new("research.jsonl")).expect("prepare");
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file_name, OsString::from("research.jsonl"));
    }

    #[test]
    fn unusable_log_directory_is_reported() {
        let root = tempfile::tempdir().expect("tempdir");
        let blocker = root.path().join("not-a-dir");
        std::fs::write(&blocker, b"").expect("write blocker");
        let err = prepare_log_file(&blocker.join("research.jsonl")).expect_err("file as dir");
        assert!(matches!(err, ResearchError::Io(msg) if msg.contains("not-a-dir")));
    }
}
