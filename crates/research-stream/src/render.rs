use crate::aggregate::AggregatorState;

/// First emission of every run, sent before the engine is contacted.
pub const STARTED_PLACEHOLDER: &str = "Research started… please wait.";
/// Shown while a run has produced neither output nor status.
pub const IN_PROGRESS_PLACEHOLDER: &str = "Research in progress…";
/// Header line that introduces the status log.
pub const STATUS_HEADER: &str = "**Status updates**";
/// Prefix of the single emission produced by a failed run.
pub const FAILURE_PREFIX: &str = "Research failed: ";

/// Renders the display string for the current state. Never empty.
pub fn render(state: &AggregatorState) -> String {
    if state.is_empty() {
        return IN_PROGRESS_PLACEHOLDER.to_string();
    }
    let mut out = state.output_text.clone();
    if !state.status_log.is_empty() {
        out.push_str("\n\n");
        out.push_str(STATUS_HEADER);
        out.push('\n');
        out.push_str(&state.status_log.join("\n"));
    }
    out
}

pub(crate) fn failure_message(reason: &str) -> String {
    format!("{FAILURE_PREFIX}{reason}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_renders_placeholder() {
        assert_eq!(render(&AggregatorState::new()), "Research in progress…");
    }

    #[test]
    fn output_only_renders_verbatim() {
        let state = AggregatorState {
            output_text: "Draft report".into(),
            status_log: Vec::new(),
        };
        assert_eq!(render(&state), "Draft report");
    }

    #[test]
    fn status_section_follows_blank_line_even_without_output() {
        let state = AggregatorState {
            output_text: String::new(),
            status_log: vec!["Planner is working…".into()],
        };
        assert_eq!(render(&state), "\n\n**Status updates**\nPlanner is working…");
    }

    #[test]
    fn status_fragments_keep_insertion_order() {
        let state = AggregatorState {
            output_text: "Summary.".into(),
            status_log: vec![
                "A is working…".into(),
                "Calling tool: search".into(),
                "Tool call completed".into(),
            ],
        };
        assert_eq!(
            render(&state),
            "Summary.\n\n**Status updates**\nA is working…\nCalling tool: search\nTool call completed"
        );
    }

    #[test]
    fn failure_message_is_prefixed() {
        assert_eq!(failure_message("boom"), "Research failed: boom");
    }
}
