//! Progress reporting and cancellation
//!
//! The core knows nothing about the UI driving it. Callers hand in a
//! [`ProgressSink`] (a closure, a channel sender or [`NoProgress`]) and
//! optionally a [`CancellationToken`] shared with whoever may abort the run.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Pipeline milestones for one document
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Processing of a document began
    Started {
        /// Source identifier
        source: String,
        /// Input size
        bytes: usize,
    },
    /// Encoding was detected
    Decoded {
        /// Source identifier
        source: String,
        /// Detected encoding label
        encoding: String,
        /// Detection confidence
        confidence: f32,
    },
    /// Boundary candidates were located
    BoundariesDetected {
        /// Source identifier
        source: String,
        /// Number of candidates
        candidates: usize,
    },
    /// The chapter set is ready
    Segmented {
        /// Source identifier
        source: String,
        /// Number of chapters
        chapters: usize,
    },
    /// The document failed
    Failed {
        /// Source identifier
        source: String,
        /// Error message
        error: String,
    },
    /// The document was cancelled
    Cancelled {
        /// Source identifier
        source: String,
    },
}

impl ProgressEvent {
    /// Source identifier the event refers to
    pub fn source(&self) -> &str {
        match self {
            ProgressEvent::Started { source, .. }
            | ProgressEvent::Decoded { source, .. }
            | ProgressEvent::BoundariesDetected { source, .. }
            | ProgressEvent::Segmented { source, .. }
            | ProgressEvent::Failed { source, .. }
            | ProgressEvent::Cancelled { source } => source,
        }
    }

    /// Whether this is the last event for its document
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Segmented { .. }
                | ProgressEvent::Failed { .. }
                | ProgressEvent::Cancelled { .. }
        )
    }
}

/// Receiver of progress events
///
/// Sinks are shared across worker threads.
pub trait ProgressSink: Send + Sync {
    /// Handle one event
    fn report(&self, event: &ProgressEvent);
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: &ProgressEvent) {}
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}

impl ProgressSink for Sender<ProgressEvent> {
    fn report(&self, event: &ProgressEvent) {
        // A dropped receiver just means nobody is listening anymore
        let _ = self.send(event.clone());
    }
}

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation for every holder of this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Return [`Error::Cancelled`] once cancellation was requested
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
