use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

/// Identifier that groups every log line and trace record of one run.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TraceId(String);

impl TraceId {
    /// Generates a fresh `trace_<32 hex>` identifier.
    pub fn generate() -> Self {
        Self(format!("trace_{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a trace scope ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TraceStatus {
    Completed,
    Failed,
    /// The scope was dropped before the run recorded an outcome
    /// (consumer went away, task aborted).
    Abandoned,
}

/// Receives trace open/close notifications.
pub trait TraceObserver: Send + Sync {
    fn on_open(&self, name: &str, id: &TraceId);
    fn on_close(&self, name: &str, id: &TraceId, status: TraceStatus);
}

/// Scoped trace resource. Closes exactly once, when dropped.
pub struct TraceScope {
    name: String,
    id: TraceId,
    status: TraceStatus,
    opened_at: Instant,
    observer: Option<Arc<dyn TraceObserver>>,
}

impl TraceScope {
    pub fn open(
        name: impl Into<String>,
        id: TraceId,
        observer: Option<Arc<dyn TraceObserver>>,
    ) -> Self {
        let name = name.into();
        info!(trace_id = %id, trace = %name, "trace opened");
        if let Some(observer) = &observer {
            observer.on_open(&name, &id);
        }
        Self {
            name,
            id,
            status: TraceStatus::Abandoned,
            opened_at: Instant::now(),
            observer,
        }
    }

    /// Records the outcome reported when the scope closes.
    pub fn set_status(&mut self, status: TraceStatus) {
        self.status = status;
    }
}

impl Drop for TraceScope {
    fn drop(&mut self) {
        let elapsed_ms = self.opened_at.elapsed().as_millis() as u64;
        match self.status {
            TraceStatus::Completed => {
                info!(trace_id = %self.id, elapsed_ms, "trace closed")
            }
            status => {
                debug!(trace_id = %self.id, elapsed_ms, ?status, "trace closed without completion")
            }
        }
        if let Some(observer) = &self.observer {
            observer.on_close(&self.name, &self.id, self.status);
        }
    }
}
