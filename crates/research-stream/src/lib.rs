//! Incremental rendering of a research agent's progress.
//!
//! A run pulls lifecycle events from an [`AgentEngine`] one at a time,
//! classifies each one, folds it into an [`AggregatorState`], and emits a
//! fresh display string after every meaningful event. Once the event stream
//! ends, the engine's final result (or the incremental view, if there is
//! none) is emitted last.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use research_stream::prelude::*;
//! use research_stream::replay::ScriptedEngine;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ResearchError> {
//! let engine = ScriptedEngine::load_events("events.jsonl")?;
//! let researcher = Researcher::builder()
//!     .engine(Arc::new(engine))
//!     .config(ResearchConfig::from_env()?)
//!     .build()?;
//!
//! let mut run = researcher.run("State of solid-state batteries").await?;
//! while let Some(render) = run.next_render().await {
//!     println!("{render}");
//! }
//! # Ok(())
//! # }
//! ```

/// Folding classified actions into the run's accumulated state.
pub mod aggregate;
/// Mapping raw engine events to state actions.
pub mod classify;
/// Researcher settings and environment loading.
pub mod config;
/// Agent engine contract and final result types.
pub mod engine;
/// Public error types.
pub mod errors;
/// Engine lifecycle event data model.
pub mod event;
/// Process-wide logging setup.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;
/// Display strings for a run's state.
pub mod render;
/// Scripted engine that replays recorded events.
pub mod replay;
/// Researcher entry point and builder.
pub mod researcher;
/// Run orchestration, render stream, and cancellation handle.
pub mod run;
/// Trace identifiers and the scoped trace resource.
pub mod trace;

pub use aggregate::AggregatorState;
pub use classify::{ClassifiedAction, classify};
pub use config::{ResearchConfig, RunOptions};
pub use engine::{AgentEngine, AgentRef, EngineStream, FinalResult, ReportData};
pub use errors::{EngineError, ResearchError, RunFailure};
pub use event::{AgentInfo, Item, RawEvent, ToolCall};
pub use render::render;
pub use researcher::{Researcher, ResearcherBuilder};
pub use run::{AbortHandle, RenderStream, RunSummary};
pub use trace::{TraceId, TraceObserver, TraceScope, TraceStatus};
