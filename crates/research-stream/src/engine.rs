use std::fmt;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::errors::EngineError;
use crate::event::RawEvent;

/// Agent handed to the engine when a run starts.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AgentRef {
    pub name: String,
}

impl AgentRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for AgentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Handle returned by `AgentEngine::start_stream`.
///
/// `events` is single-pass. `final_result` must only be awaited once
/// `events` has been exhausted.
pub struct EngineStream {
    pub events: BoxStream<'static, Result<RawEvent, EngineError>>,
    pub final_result: BoxFuture<'static, Result<Option<FinalResult>, EngineError>>,
}

/// Execution engine that runs an agent for a query and streams its
/// lifecycle events.
#[async_trait::async_trait]
pub trait AgentEngine: Send + Sync {
    /// Starts a streamed run. Errors here are startup failures.
    async fn start_stream(
        &self,
        agent: &AgentRef,
        query: &str,
    ) -> Result<EngineStream, EngineError>;
}

/// Structured report produced by a research agent.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReportData {
    #[serde(default)]
    pub short_summary: String,
    pub markdown_report: String,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
}

/// Authoritative output of a finished run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum FinalResult {
    Report(ReportData),
    Value(Value),
}

impl FinalResult {
    /// Wraps plain text output.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Value(Value::String(text.into()))
    }

    /// True for a JSON `null` result, which carries no output of its own.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    /// Returns the displayable report field, if the result exposes one.
    pub fn report(&self) -> Option<&str> {
        match self {
            Self::Report(data) => Some(&data.markdown_report),
            Self::Value(Value::Object(map)) => map.get("markdown_report").and_then(Value::as_str),
            Self::Value(_) => None,
        }
    }
}

impl fmt::Display for FinalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Report(data) => f.write_str(&data.markdown_report),
            Self::Value(Value::String(text)) => f.write_str(text),
            Self::Value(other) => write!(f, "{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_field_is_found_on_structured_results() {
        let result: FinalResult = serde_json::from_value(serde_json::json!({
            "short_summary": "s",
            "markdown_report": "# Report",
            "follow_up_questions": ["q1"]
        }))
        .expect("decode");
        assert!(matches!(result, FinalResult::Report(_)));
        assert_eq!(result.report(), Some("# Report"));
    }

    #[test]
    fn plain_values_have_no_report_field() {
        let result = FinalResult::text("just text");
        assert_eq!(result.report(), None);
        assert_eq!(result.to_string(), "just text");

        let result = FinalResult::Value(serde_json::json!({"answer": 42}));
        assert_eq!(result.report(), None);
        assert_eq!(result.to_string(), r#"{"answer":42}"#);
    }

    #[test]
    fn null_result_is_absent() {
        let result: FinalResult = serde_json::from_str("null").expect("decode");
        assert!(result.is_absent());
        assert!(!FinalResult::text("").is_absent());
        assert!(!FinalResult::Value(serde_json::json!({})).is_absent());
    }

    #[test]
    fn non_string_report_field_is_not_displayable() {
        let result = FinalResult::Value(serde_json::json!({"markdown_report": 7}));
        assert_eq!(result.report(), None);
    }
}
