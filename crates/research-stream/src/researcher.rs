use std::sync::Arc;

use crate::config::{ResearchConfig, RunOptions};
use crate::engine::{AgentEngine, AgentRef};
use crate::errors::ResearchError;
use crate::run::{RenderStream, RunContext};
use crate::trace::{TraceId, TraceObserver};

pub(crate) struct ResearcherInner {
    engine: Arc<dyn AgentEngine>,
    config: ResearchConfig,
    observer: Option<Arc<dyn TraceObserver>>,
}

/// Entry point for starting research runs against one engine.
///
/// Cheap to clone; every call to `run` gets its own state, trace scope and
/// engine stream, so concurrent runs never share anything mutable.
#[derive(Clone)]
pub struct Researcher {
    inner: Arc<ResearcherInner>,
}

impl Researcher {
    /// Starts a builder for configuring the engine and run options.
    pub fn builder() -> ResearcherBuilder {
        ResearcherBuilder::default()
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.inner.config
    }

    /// Starts one run for `query` and returns its render sequence.
    ///
    /// The query is forwarded to the engine unchanged, empty strings included.
    /// Fails with `ResearchError::Runtime` when polled outside a tokio runtime.
    pub async fn run(&self, query: impl Into<String>) -> Result<RenderStream, ResearchError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| ResearchError::Runtime(err.to_string()))?;
        let inner = &self.inner;
        let stream = RenderStream::spawn(&runtime, RunContext {
            engine: inner.engine.clone(),
            agent: AgentRef::new(inner.config.agent_name.clone()),
            query: query.into(),
            trace_name: inner.config.trace_name.clone(),
            trace_id: TraceId::generate(),
            options: inner.config.options.clone(),
            observer: inner.observer.clone(),
        });
        Ok(stream)
    }
}

/// Builder used to wire an engine and settings into a `Researcher`.
#[derive(Default)]
pub struct ResearcherBuilder {
    engine: Option<Arc<dyn AgentEngine>>,
    config: ResearchConfig,
    observer: Option<Arc<dyn TraceObserver>>,
}

impl ResearcherBuilder {
    /// Sets the engine every run is started on.
    pub fn engine(mut self, engine: Arc<dyn AgentEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Replaces the whole configuration (for example one read by
    /// `ResearchConfig::from_env`).
    pub fn config(mut self, config: ResearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn options(mut self, options: RunOptions) -> Self {
        self.config.options = options;
        self
    }

    pub fn agent_name(mut self, name: impl Into<String>) -> Self {
        self.config.agent_name = name.into();
        self
    }

    pub fn trace_name(mut self, name: impl Into<String>) -> Self {
        self.config.trace_name = name.into();
        self
    }

    /// Registers an observer notified when each run's trace opens and closes.
    pub fn trace_observer(mut self, observer: Arc<dyn TraceObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Validates settings and builds the researcher.
    pub fn build(self) -> Result<Researcher, ResearchError> {
        let engine = self
            .engine
            .ok_or_else(|| ResearchError::Config("no agent engine configured".into()))?;
        if self.config.agent_name.trim().is_empty() {
            return Err(ResearchError::Validation(
                "agent name must not be empty".into(),
            ));
        }
        self.config.options.validate()?;
        Ok(Researcher {
            inner: Arc::new(ResearcherInner {
                engine,
                config: self.config,
                observer: self.observer,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineStream;
    use crate::errors::EngineError;

    struct DummyEngine;

    #[async_trait::async_trait]
    impl AgentEngine for DummyEngine {
        async fn start_stream(
            &self,
            _agent: &AgentRef,
            _query: &str,
        ) -> Result<EngineStream, EngineError> {
            unreachable!("not used in this test")
        }
    }

    #[test]
    fn build_requires_an_engine() {
        let result = Researcher::builder().build();
        assert!(
            matches!(result, Err(ResearchError::Config(message)) if message.contains("no agent engine"))
        );
    }

    #[test]
    fn build_rejects_zero_buffer_and_blank_agent() {
        let result = Researcher::builder()
            .engine(Arc::new(DummyEngine))
            .options(RunOptions::default().stream_buffer_capacity(0))
            .build();
        assert!(matches!(result, Err(ResearchError::Validation(_))));

        let result = Researcher::builder()
            .engine(Arc::new(DummyEngine))
            .agent_name("  ")
            .build();
        assert!(matches!(result, Err(ResearchError::Validation(msg)) if msg.contains("agent name")));
    }

    #[test]
    fn run_outside_a_runtime_is_an_error() {
        let researcher = Researcher::builder()
            .engine(Arc::new(DummyEngine))
            .build()
            .expect("build");
        let result = futures::executor::block_on(researcher.run("q"));
        assert!(matches!(result, Err(ResearchError::Runtime(_))));
    }

    #[test]
    fn builder_setters_land_in_config() {
        let researcher = Researcher::builder()
            .engine(Arc::new(DummyEngine))
            .agent_name("Manager")
            .trace_name("Deep research")
            .build()
            .expect("build");
        assert_eq!(researcher.config().agent_name, "Manager");
        assert_eq!(researcher.config().trace_name, "Deep research");
        assert_eq!(researcher.config().options.stream_buffer_capacity, 1);
    }
}
