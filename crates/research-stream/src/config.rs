use std::time::Duration;

use crate::errors::ResearchError;

pub const DEFAULT_TRACE_NAME: &str = "Research trace";
pub const DEFAULT_AGENT_NAME: &str = "Research agent";

/// Per-run behavior options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    /// Optional ceiling on the whole run.
    pub timeout: Option<Duration>,
    /// Renders buffered between the run task and the consumer. `1` means the
    /// run waits for each render to be taken before pulling the next event.
    pub stream_buffer_capacity: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            stream_buffer_capacity: 1,
        }
    }
}

impl RunOptions {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn stream_buffer_capacity(mut self, capacity: usize) -> Self {
        self.stream_buffer_capacity = capacity;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ResearchError> {
        if self.stream_buffer_capacity == 0 {
            return Err(ResearchError::Validation(
                "stream_buffer_capacity must be greater than 0".into(),
            ));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ResearchError::Validation(
                "timeout must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for a `Researcher`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResearchConfig {
    /// Name recorded on each run's trace scope.
    pub trace_name: String,
    /// Agent handed to the engine.
    pub agent_name: String,
    pub options: RunOptions,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            trace_name: DEFAULT_TRACE_NAME.to_string(),
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            options: RunOptions::default(),
        }
    }
}

impl ResearchConfig {
    /// Builds a config from process environment variables.
    ///
    /// - `RESEARCH_TRACE_NAME`: trace scope name.
    /// - `RESEARCH_AGENT_NAME`: agent handed to the engine.
    /// - `RESEARCH_STREAM_BUFFER`: render buffer capacity (positive integer).
    /// - `RESEARCH_TIMEOUT_SECS`: optional run ceiling in seconds.
    pub fn from_env() -> Result<Self, ResearchError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ResearchError> {
        let mut config = Self::default();
        if let Some(name) = non_blank(lookup("RESEARCH_TRACE_NAME")) {
            config.trace_name = name;
        }
        if let Some(name) = non_blank(lookup("RESEARCH_AGENT_NAME")) {
            config.agent_name = name;
        }
        if let Some(raw) = non_blank(lookup("RESEARCH_STREAM_BUFFER")) {
            config.options.stream_buffer_capacity = parse_positive("RESEARCH_STREAM_BUFFER", &raw)?;
        }
        if let Some(raw) = non_blank(lookup("RESEARCH_TIMEOUT_SECS")) {
            let secs = parse_positive("RESEARCH_TIMEOUT_SECS", &raw)?;
            config.options.timeout = Some(Duration::from_secs(secs as u64));
        }
        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_positive(key: &str, raw: &str) -> Result<usize, ResearchError> {
    match raw.parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ResearchError::Config(format!(
            "{key} must be a positive integer, got {raw:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = ResearchConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config, ResearchConfig::default());
        assert_eq!(config.options.stream_buffer_capacity, 1);
        assert_eq!(config.trace_name, "Research trace");
    }

    #[test]
    fn overrides_are_read_and_trimmed() {
        let config = ResearchConfig::from_lookup(lookup(&[
            ("RESEARCH_TRACE_NAME", " Deep research "),
            ("RESEARCH_AGENT_NAME", "Manager"),
            ("RESEARCH_STREAM_BUFFER", "8"),
            ("RESEARCH_TIMEOUT_SECS", "90"),
            ("RESEARCH_UNRELATED", "x"),
        ]))
        .expect("config");
        assert_eq!(config.trace_name, "Deep research");
        assert_eq!(config.agent_name, "Manager");
        assert_eq!(config.options.stream_buffer_capacity, 8);
        assert_eq!(config.options.timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn invalid_numbers_are_config_errors() {
        let err = ResearchConfig::from_lookup(lookup(&[("RESEARCH_STREAM_BUFFER", "0")]))
            .expect_err("zero buffer");
        assert!(matches!(err, ResearchError::Config(msg) if msg.contains("RESEARCH_STREAM_BUFFER")));

        let err = ResearchConfig::from_lookup(lookup(&[("RESEARCH_TIMEOUT_SECS", "soon")]))
            .expect_err("bad timeout");
        assert!(matches!(err, ResearchError::Config(msg) if msg.contains("soon")));
    }

    #[test]
    fn run_options_validation_rejects_zero_capacity() {
        let err = RunOptions::default()
            .stream_buffer_capacity(0)
            .validate()
            .expect_err("zero capacity");
        assert!(matches!(err, ResearchError::Validation(_)));
        assert!(RunOptions::default().validate().is_ok());
    }
}
