use crate::event::{Item, RawEvent};

/// What a single event does to the run's aggregated state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassifiedAction {
    /// Transport noise: no state change and no render.
    Skip,
    /// Append one fragment to the status log.
    AppendStatus(String),
    /// Append text to the accumulated output.
    AppendOutput(String),
    /// Leave state unchanged but still render.
    NoOp,
}

impl ClassifiedAction {
    /// Every action except `Skip` produces a render.
    pub fn renders(&self) -> bool {
        !matches!(self, Self::Skip)
    }
}

/// Maps one engine event to the action it triggers.
pub fn classify(event: &RawEvent) -> ClassifiedAction {
    match event {
        RawEvent::RawResponse { .. } => ClassifiedAction::Skip,
        RawEvent::AgentUpdated { new_agent } => {
            ClassifiedAction::AppendStatus(format!("{} is working…", new_agent.name))
        }
        RawEvent::RunItem { item } => match item {
            Item::ToolCall { raw_item } => {
                ClassifiedAction::AppendStatus(format!("Calling tool: {}", raw_item.name))
            }
            Item::ToolCallOutput { .. } => {
                ClassifiedAction::AppendStatus("Tool call completed".to_string())
            }
            Item::MessageOutput {
                output: Some(text),
            } if !text.is_empty() => ClassifiedAction::AppendOutput(text.clone()),
            Item::MessageOutput { .. } | Item::Unknown => ClassifiedAction::NoOp,
        },
        RawEvent::Unknown => ClassifiedAction::NoOp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_response_is_skipped_without_render() {
        let action = classify(&RawEvent::raw_response(serde_json::json!({"delta":"x"})));
        assert_eq!(action, ClassifiedAction::Skip);
        assert!(!action.renders());
    }

    #[test]
    fn status_fragments_use_display_wording() {
        assert_eq!(
            classify(&RawEvent::agent_updated("Planner")),
            ClassifiedAction::AppendStatus("Planner is working…".into())
        );
        assert_eq!(
            classify(&RawEvent::tool_call("web_search")),
            ClassifiedAction::AppendStatus("Calling tool: web_search".into())
        );
        assert_eq!(
            classify(&RawEvent::tool_call_output(serde_json::json!("results"))),
            ClassifiedAction::AppendStatus("Tool call completed".into())
        );
    }

    #[test]
    fn message_output_appends_text_only_when_non_empty() {
        assert_eq!(
            classify(&RawEvent::message_output("Summary.")),
            ClassifiedAction::AppendOutput("Summary.".into())
        );
        let empty = classify(&RawEvent::message_output(""));
        assert_eq!(empty, ClassifiedAction::NoOp);
        assert!(empty.renders());
        assert_eq!(
            classify(&RawEvent::empty_message_output()),
            ClassifiedAction::NoOp
        );
    }

    #[test]
    fn unrecognized_events_are_renderable_no_ops() {
        assert_eq!(classify(&RawEvent::Unknown), ClassifiedAction::NoOp);
        assert_eq!(
            classify(&RawEvent::RunItem { item: Item::Unknown }),
            ClassifiedAction::NoOp
        );
    }
}
