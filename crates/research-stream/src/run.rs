use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::StreamExt as _;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{Instrument as _, debug, info, warn};

use crate::aggregate::AggregatorState;
use crate::classify::classify;
use crate::config::RunOptions;
use crate::engine::{AgentEngine, AgentRef, EngineStream};
use crate::errors::{ResearchError, RunFailure};
use crate::render::{STARTED_PLACEHOLDER, failure_message, render};
use crate::trace::{TraceId, TraceObserver, TraceScope, TraceStatus};

/// Handle used to request cancellation of a running research run.
#[derive(Clone)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

impl AbortHandle {
    /// Requests cancellation.
    ///
    /// The run stops at its next suspension point and emits one failure
    /// render (`Research failed: run cancelled`) if the consumer is still
    /// listening.
    pub fn abort(&self) {
        let _ = self.tx.send(true);
    }
}

/// Outcome of a run that reached `Done`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub trace_id: TraceId,
    /// Number of renders emitted, placeholder included.
    pub renders: usize,
    /// The last string emitted.
    pub final_render: Option<String>,
}

/// Everything one run task owns.
pub(crate) struct RunContext {
    pub(crate) engine: Arc<dyn AgentEngine>,
    pub(crate) agent: AgentRef,
    pub(crate) query: String,
    pub(crate) trace_name: String,
    pub(crate) trace_id: TraceId,
    pub(crate) options: RunOptions,
    pub(crate) observer: Option<Arc<dyn TraceObserver>>,
}

/// Sequence of rendered strings produced by one run.
///
/// Each render supersedes the previous one for display purposes. Dropping
/// the stream stops the run and releases its trace scope.
pub struct RenderStream {
    trace_id: TraceId,
    rx: mpsc::Receiver<String>,
    final_rx: oneshot::Receiver<Result<RunSummary, ResearchError>>,
    abort_handle: AbortHandle,
}

impl RenderStream {
    /// Spawns the run task on `runtime`.
    pub(crate) fn spawn(runtime: &tokio::runtime::Handle, ctx: RunContext) -> Self {
        let (tx, rx) = mpsc::channel(ctx.options.stream_buffer_capacity);
        let (final_tx, final_rx) = oneshot::channel();
        let (abort_tx, abort_rx) = watch::channel(false);

        let trace_id = ctx.trace_id.clone();
        let span = tracing::info_span!("research_run", trace_id = %trace_id, agent = %ctx.agent);
        runtime.spawn(run_task(ctx, tx, final_tx, abort_rx).instrument(span));

        Self {
            trace_id,
            rx,
            final_rx,
            abort_handle: AbortHandle { tx: abort_tx },
        }
    }

    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    /// Returns a handle that can cancel the run.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort_handle.clone()
    }

    /// Waits for the next render.
    ///
    /// Returns `None` once the run has emitted its last string.
    pub async fn next_render(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Drains remaining renders and returns the run's terminal outcome.
    pub async fn finish(mut self) -> Result<RunSummary, ResearchError> {
        while self.rx.recv().await.is_some() {}
        match self.final_rx.await {
            Ok(result) => result,
            Err(_) => Err(ResearchError::protocol_msg(format!(
                "run task ended without final outcome (trace={})",
                self.trace_id
            ))),
        }
    }
}

impl futures::Stream for RenderStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        self.rx.poll_recv(cx)
    }
}

/// Why a run stopped before `Done`.
enum Halt {
    Failed(RunFailure),
    ConsumerGone,
}

/// Sends renders downstream and remembers what was sent.
struct Emitter<'a> {
    tx: &'a mpsc::Sender<String>,
    emitted: usize,
    last: Option<String>,
}

impl Emitter<'_> {
    async fn emit(&mut self, text: String) -> Result<(), Halt> {
        self.tx
            .send(text.clone())
            .await
            .map_err(|_| Halt::ConsumerGone)?;
        self.emitted += 1;
        self.last = Some(text);
        Ok(())
    }
}

async fn run_task(
    ctx: RunContext,
    tx: mpsc::Sender<String>,
    final_tx: oneshot::Sender<Result<RunSummary, ResearchError>>,
    mut abort_rx: watch::Receiver<bool>,
) {
    let mut scope = TraceScope::open(
        ctx.trace_name.clone(),
        ctx.trace_id.clone(),
        ctx.observer.clone(),
    );
    let mut emitter = Emitter {
        tx: &tx,
        emitted: 0,
        last: None,
    };

    let halted = tokio::select! {
        biased;
        _ = abort_requested(&mut abort_rx) => Err(Halt::Failed(RunFailure::Cancelled)),
        _ = tx.closed() => Err(Halt::ConsumerGone),
        result = drive_with_ceiling(&ctx, &mut emitter) => result,
    };

    let outcome = match halted {
        Ok(()) => {
            scope.set_status(TraceStatus::Completed);
            info!(renders = emitter.emitted, "research run completed");
            Ok(RunSummary {
                trace_id: ctx.trace_id.clone(),
                renders: emitter.emitted,
                final_render: emitter.last.clone(),
            })
        }
        Err(Halt::Failed(failure)) => {
            scope.set_status(TraceStatus::Failed);
            warn!(error = %failure, "research run failed");
            let _ = emitter
                .emit(failure_message(&failure.user_message()))
                .await;
            Err(ResearchError::RunFailed(failure))
        }
        Err(Halt::ConsumerGone) => {
            debug!(renders = emitter.emitted, "render consumer dropped; stopping run");
            Err(ResearchError::protocol_msg(
                "render consumer dropped before the run finished",
            ))
        }
    };
    let _ = final_tx.send(outcome);
}

async fn abort_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Every abort handle is gone; cancellation can no longer happen.
            std::future::pending::<()>().await;
        }
    }
}

async fn drive_with_ceiling(ctx: &RunContext, emitter: &mut Emitter<'_>) -> Result<(), Halt> {
    match ctx.options.timeout {
        Some(limit) => tokio::time::timeout(limit, drive(ctx, emitter))
            .await
            .unwrap_or(Err(Halt::Failed(RunFailure::TimedOut(limit)))),
        None => drive(ctx, emitter).await,
    }
}

/// Starting -> Streaming -> Resolving. Every emission waits for the
/// consumer's channel slot before the next event is pulled.
async fn drive(ctx: &RunContext, emitter: &mut Emitter<'_>) -> Result<(), Halt> {
    emitter.emit(STARTED_PLACEHOLDER.to_string()).await?;

    let EngineStream {
        mut events,
        final_result,
    } = ctx
        .engine
        .start_stream(&ctx.agent, &ctx.query)
        .await
        .map_err(|err| Halt::Failed(RunFailure::Startup(err)))?;
    debug!(query_len = ctx.query.len(), "engine stream started");

    let mut state = AggregatorState::new();
    while let Some(next) = events.next().await {
        let event = next.map_err(|err| Halt::Failed(RunFailure::Stream(err)))?;
        let action = classify(&event);
        let renders = action.renders();
        state.apply(action);
        debug!(
            kind = event.kind(),
            statuses = state.status_log.len(),
            output_len = state.output_text.len(),
            "engine event applied"
        );
        if renders {
            emitter.emit(render(&state)).await?;
        }
    }
    drop(events);

    let final_render = match final_result.await {
        Ok(Some(result)) if !result.is_absent() => match result.report() {
            Some(report) => report.to_string(),
            None => result.to_string(),
        },
        Ok(_) => render(&state),
        Err(err) => return Err(Halt::Failed(RunFailure::FinalResult(err))),
    };
    emitter.emit(final_render).await
}
