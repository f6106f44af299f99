use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle event emitted by the agent engine during a run.
///
/// The wire tag lives in the `type` field. Tags this crate does not know
/// deserialize to `Unknown` so newer engines never break a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RawEvent {
    /// Low-level transport chunk from the model API.
    #[serde(rename = "raw_response_event")]
    RawResponse {
        #[serde(default)]
        data: Value,
    },
    /// A different sub-agent took over the run.
    #[serde(rename = "agent_updated_stream_event")]
    AgentUpdated { new_agent: AgentInfo },
    /// A run item (tool call, tool output, message) was produced.
    #[serde(rename = "run_item_stream_event")]
    RunItem { item: Item },
    #[serde(other)]
    Unknown,
}

/// Agent descriptor carried by `agent_updated_stream_event`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
}

/// Raw tool call payload; only the tool name is displayed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
}

/// Item nested inside a `run_item_stream_event`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Item {
    #[serde(rename = "tool_call_item")]
    ToolCall { raw_item: ToolCall },
    /// Tool output is opaque and never displayed.
    #[serde(rename = "tool_call_output_item")]
    ToolCallOutput {
        #[serde(default)]
        output: Value,
    },
    #[serde(rename = "message_output_item")]
    MessageOutput {
        #[serde(default)]
        output: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl RawEvent {
    pub fn raw_response(data: Value) -> Self {
        Self::RawResponse { data }
    }

    pub fn agent_updated(name: impl Into<String>) -> Self {
        Self::AgentUpdated {
            new_agent: AgentInfo { name: name.into() },
        }
    }

    pub fn tool_call(name: impl Into<String>) -> Self {
        Self::RunItem {
            item: Item::ToolCall {
                raw_item: ToolCall { name: name.into() },
            },
        }
    }

    pub fn tool_call_output(output: Value) -> Self {
        Self::RunItem {
            item: Item::ToolCallOutput { output },
        }
    }

    pub fn message_output(output: impl Into<String>) -> Self {
        Self::RunItem {
            item: Item::MessageOutput {
                output: Some(output.into()),
            },
        }
    }

    /// Message item with no text, as emitted for empty assistant turns.
    pub fn empty_message_output() -> Self {
        Self::RunItem {
            item: Item::MessageOutput { output: None },
        }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RawResponse { .. } => "raw_response_event",
            Self::AgentUpdated { .. } => "agent_updated_stream_event",
            Self::RunItem { item } => match item {
                Item::ToolCall { .. } => "tool_call_item",
                Item::ToolCallOutput { .. } => "tool_call_output_item",
                Item::MessageOutput { .. } => "message_output_item",
                Item::Unknown => "run_item_stream_event",
            },
            Self::Unknown => "unknown",
        }
    }
}
