use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use research_stream::ResearchError;
use research_stream::replay::ScriptedEngine;

#[derive(Parser, Debug)]
#[command(name = "research-stream")]
#[command(version)]
#[command(about = "Stream incremental research progress from an agent run")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replays recorded engine events and prints every render
    Replay(ReplayArgs),
}

#[derive(clap::Args, Debug)]
pub struct ReplayArgs {
    /// JSON Lines file with one engine event per line
    #[arg(value_name = "EVENTS")]
    pub events: PathBuf,

    /// Research query handed to the engine
    #[arg(value_name = "QUERY", default_value = "")]
    pub query: String,

    /// JSON file holding the engine's final result
    #[arg(long, value_name = "PATH")]
    pub final_result: Option<PathBuf>,

    /// Fail the run at startup with this message
    #[arg(long, value_name = "MESSAGE")]
    pub startup_error: Option<String>,

    /// Delay before each replayed event, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 0)]
    pub delay_ms: u64,

    /// Print only the last render instead of every intermediate one
    #[arg(long)]
    pub latest_only: bool,
}

impl ReplayArgs {
    pub fn build_engine(&self) -> Result<ScriptedEngine, ResearchError> {
        let mut engine = ScriptedEngine::load_events(&self.events)?
            .event_delay(Duration::from_millis(self.delay_ms));
        if let Some(path) = &self.final_result {
            engine = engine.load_final_result(path)?;
        }
        if let Some(message) = &self.startup_error {
            engine = engine.startup_error(message.clone());
        }
        Ok(engine)
    }
}
