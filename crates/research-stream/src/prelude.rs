//! Common imports for typical research-stream usage.
//!
//! This module exports the types most callers need to wire an engine, start
//! runs, and consume renders.
pub use crate::{
    AbortHandle, AgentEngine, AgentRef, EngineError, EngineStream, FinalResult, RawEvent,
    RenderStream, ReportData, ResearchConfig, ResearchError, Researcher, ResearcherBuilder,
    RunFailure, RunOptions, RunSummary,
};
