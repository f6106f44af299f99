use crate::classify::ClassifiedAction;

/// Accumulated view of one run: output text plus the ordered status log.
///
/// Both fields only grow. A fresh state is created for every run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregatorState {
    pub output_text: String,
    pub status_log: Vec<String>,
}

impl AggregatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one classified action into the state.
    pub fn apply(&mut self, action: ClassifiedAction) {
        match action {
            ClassifiedAction::AppendStatus(fragment) => self.status_log.push(fragment),
            ClassifiedAction::AppendOutput(text) => self.output_text.push_str(&text),
            ClassifiedAction::Skip | ClassifiedAction::NoOp => {}
        }
    }

    /// True until any output or status has been recorded.
    pub fn is_empty(&self) -> bool {
        self.output_text.is_empty() && self.status_log.is_empty()
    }
}
