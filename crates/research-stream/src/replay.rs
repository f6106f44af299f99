//! Scripted engine that replays recorded lifecycle events.
//!
//! Useful for demos and for exercising the render pipeline without a live
//! agent. Events are read from JSON Lines: one `RawEvent` object per line,
//! blank lines and `#` comments ignored.

use std::path::Path;
use std::time::Duration;

use futures::{FutureExt as _, StreamExt as _, stream};
use tracing::debug;

use crate::engine::{AgentEngine, AgentRef, EngineStream, FinalResult};
use crate::errors::{EngineError, ResearchError};
use crate::event::RawEvent;

/// One scripted step of a replayed run.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptStep {
    Event(RawEvent),
    /// The engine fails mid-stream with this message.
    Fault(String),
}

/// `AgentEngine` that replays a fixed script on every run.
#[derive(Clone, Debug, Default)]
pub struct ScriptedEngine {
    steps: Vec<ScriptStep>,
    final_result: Option<FinalResult>,
    startup_error: Option<String>,
    event_delay: Option<Duration>,
}

impl ScriptedEngine {
    pub fn new(events: impl IntoIterator<Item = RawEvent>) -> Self {
        Self {
            steps: events.into_iter().map(ScriptStep::Event).collect(),
            ..Self::default()
        }
    }

    /// Parses events from JSON Lines text.
    pub fn from_jsonl_str(text: &str) -> Result<Self, ResearchError> {
        Ok(Self::new(parse_events(text)?))
    }

    /// Loads events from a JSON Lines file.
    pub fn load_events(path: impl AsRef<Path>) -> Result<Self, ResearchError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ResearchError::Io(format!("{}: {e}", path.display())))?;
        Self::from_jsonl_str(&text)
    }

    /// Loads the final result from a JSON file.
    pub fn load_final_result(mut self, path: impl AsRef<Path>) -> Result<Self, ResearchError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ResearchError::Io(format!("{}: {e}", path.display())))?;
        let result = serde_json::from_str(&text)
            .map_err(|e| ResearchError::Parse(format!("{}: {e}", path.display())))?;
        self.final_result = Some(result);
        Ok(self)
    }

    pub fn final_result(mut self, result: FinalResult) -> Self {
        self.final_result = Some(result);
        self
    }

    /// Makes every run fail at startup with `message`.
    pub fn startup_error(mut self, message: impl Into<String>) -> Self {
        self.startup_error = Some(message.into());
        self
    }

    /// Appends a mid-stream fault after the scripted events so far.
    pub fn fault(mut self, message: impl Into<String>) -> Self {
        self.steps.push(ScriptStep::Fault(message.into()));
        self
    }

    /// Pauses before each step, to mimic a live engine.
    pub fn event_delay(mut self, delay: Duration) -> Self {
        self.event_delay = Some(delay).filter(|d| !d.is_zero());
        self
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }
}

fn parse_events(text: &str) -> Result<Vec<RawEvent>, ResearchError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .map_err(|e| ResearchError::Parse(format!("line {}: {e}", idx + 1)))
        })
        .collect()
}

#[async_trait::async_trait]
impl AgentEngine for ScriptedEngine {
    async fn start_stream(
        &self,
        agent: &AgentRef,
        query: &str,
    ) -> Result<EngineStream, EngineError> {
        if let Some(message) = &self.startup_error {
            return Err(EngineError::rejected(message.clone()));
        }
        debug!(agent = %agent, query_len = query.len(), steps = self.steps.len(), "replaying script");

        let delay = self.event_delay;
        let events = stream::iter(self.steps.clone())
            .then(move |step| async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                match step {
                    ScriptStep::Event(event) => Ok(event),
                    ScriptStep::Fault(message) => Err(EngineError::transport(message)),
                }
            })
            .boxed();
        let final_result = self.final_result.clone();
        Ok(EngineStream {
            events,
            final_result: async move { Ok(final_result) }.boxed(),
        })
    }
}
