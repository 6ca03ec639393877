//! Progress reporting and the per-job transcript
//!
//! A [`ProgressSink`] is the only channel from the pipeline back to the
//! caller while a job runs. The pipeline calls it from whatever task it
//! happens to be on; a caller with a UI thread re-dispatches on its side.

use std::sync::{Arc, Mutex};

/// Receives ordered, human-readable progress messages
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Sink that drops every message
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _message: &str) {}
}

/// Ordered log of one job, forwarded to a progress sink as it grows
///
/// Cloning shares the same underlying log.
#[derive(Clone)]
pub struct Transcript {
    lines: Arc<Mutex<Vec<String>>>,
    sink: Arc<dyn ProgressSink>,
}

impl Transcript {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            lines: Arc::new(Mutex::new(Vec::new())),
            sink,
        }
    }

    /// Append a line and forward it to the sink
    pub fn report(&self, message: impl Into<String>) {
        let message = message.into();
        self.sink.report(&message);
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message);
    }

    /// Copy of every line recorded so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(Arc::new(NullProgress))
    }
}
