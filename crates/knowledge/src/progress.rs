//! Structured progress reporting for index builds.
//!
//! Provides observable, incremental feedback while a document is extracted,
//! chunked, embedded and indexed.

use std::sync::Arc;
use std::time::Instant;

/// Progress event emitted during an index build.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Phase of the operation: "extract", "chunk", "embed", "index"
    pub phase: String,

    /// Current progress (files read, chunks embedded, etc.)
    pub current: u64,

    /// Total expected work (if known)
    pub total: Option<u64>,

    /// Percentage complete (0.0 - 100.0)
    pub percentage: Option<f64>,

    /// Human-readable message
    pub message: String,

    /// Elapsed time since the reporter was created
    pub elapsed_secs: Option<f64>,
}

impl ProgressEvent {
    pub fn new(
        phase: impl Into<String>,
        current: u64,
        total: Option<u64>,
        message: impl Into<String>,
    ) -> Self {
        let percentage = total.map(|t| if t > 0 { (current as f64 / t as f64) * 100.0 } else { 0.0 });

        Self {
            phase: phase.into(),
            current,
            total,
            percentage,
            message: message.into(),
            elapsed_secs: None,
        }
    }

    pub fn with_elapsed(mut self, elapsed_secs: f64) -> Self {
        self.elapsed_secs = Some(elapsed_secs);
        self
    }

    /// Format as a simple user-facing line.
    pub fn format_simple(&self) -> String {
        let progress = match self.total {
            Some(total) => format!("{}/{}", self.current, total),
            None => format!("{}", self.current),
        };

        let pct = self
            .percentage
            .map(|p| format!(" ({:.0}%)", p))
            .unwrap_or_default();

        format!("[{}] {}{} - {}", self.phase, progress, pct, self.message)
    }
}

/// Callback for progress events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Progress reporter that emits events through a callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Arc<Instant>,
}

impl ProgressReporter {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Arc::new(Instant::now()),
        }
    }

    /// Create a reporter that only logs.
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Arc::new(Instant::now()),
        }
    }

    /// Emit a progress event.
    pub fn emit(&self, event: ProgressEvent) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let event = event.with_elapsed(elapsed);

        tracing::debug!(
            phase = %event.phase,
            current = event.current,
            total = ?event.total,
            message = %event.message,
            elapsed_secs = elapsed,
            "Progress event"
        );

        if let Some(callback) = &self.callback {
            callback(event);
        }
    }

    pub fn extract(&self, current: u64, total: Option<u64>, file: &str) {
        self.emit(ProgressEvent::new(
            "extract",
            current,
            total,
            format!("reading {}", file),
        ));
    }

    pub fn chunk(&self, chunks_created: u64) {
        self.emit(ProgressEvent::new(
            "chunk",
            chunks_created,
            None,
            format!("{} chunks created", chunks_created),
        ));
    }

    pub fn embed(&self, current: u64, total: u64, model: &str) {
        self.emit(ProgressEvent::new(
            "embed",
            current,
            Some(total),
            format!("model={}", model),
        ));
    }

    pub fn index(&self, vectors: u64) {
        self.emit(ProgressEvent::new(
            "index",
            vectors,
            Some(vectors),
            "building similarity index",
        ));
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::noop()
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
