// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Progress events, sinks and cooperative cancellation

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Event emitted while a stage runs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    StatusChanged {
        message: String,
        percent: Option<f32>,
    },
    /// Percent in `[0, 100]`
    ProgressChanged { percent: f32 },
    Warning { message: String },
    Error {
        message: String,
        cause: Option<String>,
    },
    /// Terminal event; every stage invocation ends with exactly one
    Completed { message: String, success: bool },
}

impl ProgressEvent {
    /// Clamp a percentage into `[0, 100]` (NaN becomes 0)
    pub fn clamp_percent(percent: f32) -> f32 {
        if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        }
    }

    /// Progress event with a clamped percentage
    pub fn progress(percent: f32) -> Self {
        ProgressEvent::ProgressChanged {
            percent: Self::clamp_percent(percent),
        }
    }

    /// Status event
    pub fn status(message: impl Into<String>, percent: Option<f32>) -> Self {
        ProgressEvent::StatusChanged {
            message: message.into(),
            percent: percent.map(Self::clamp_percent),
        }
    }

    /// Warning event
    pub fn warning(message: impl Into<String>) -> Self {
        ProgressEvent::Warning {
            message: message.into(),
        }
    }

    /// Error event
    pub fn error(message: impl Into<String>, cause: Option<String>) -> Self {
        ProgressEvent::Error {
            message: message.into(),
            cause,
        }
    }

    /// Completion event
    pub fn completed(message: impl Into<String>, success: bool) -> Self {
        ProgressEvent::Completed {
            message: message.into(),
            success,
        }
    }

    /// Percentage carried by this event, if any
    pub fn percent(&self) -> Option<f32> {
        match self {
            ProgressEvent::StatusChanged { percent, .. } => *percent,
            ProgressEvent::ProgressChanged { percent } => Some(*percent),
            _ => None,
        }
    }

    /// Whether this is the terminal event
    pub fn is_completed(&self) -> bool {
        matches!(self, ProgressEvent::Completed { .. })
    }
}

/// Consumer of progress events
///
/// Fire-and-forget: implementations must return quickly and never panic.
pub trait ProgressSink: Send + Sync {
    /// Deliver one event
    fn emit(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Sink that drops every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Sink forwarding events over an mpsc channel to a reporting consumer
///
/// A disconnected receiver is ignored.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    sender: Sender<ProgressEvent>,
}

impl ChannelSink {
    /// Wrap a channel sender
    pub fn new(sender: Sender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }
}

/// Sink that records every event in order
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<ProgressEvent>>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drop all recorded events
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Warning messages in order
    pub fn warnings(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Warning { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Error messages in order
    pub fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Error { message, .. } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// `success` flags of every Completed event
    pub fn completions(&self) -> Vec<bool> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Completed { success, .. } => Some(*success),
                _ => None,
            })
            .collect()
    }

    /// Every percentage reported, in order
    pub fn percentages(&self) -> Vec<f32> {
        self.events.lock().iter().filter_map(|e| e.percent()).collect()
    }
}

impl ProgressSink for EventLog {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().push(event);
    }
}

/// Poll-able cooperative cancellation signal
///
/// Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create an unset token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can be reused for another run
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_percent_clamped() {
        assert_eq!(ProgressEvent::progress(150.0).percent(), Some(100.0));
        assert_eq!(ProgressEvent::progress(-3.0).percent(), Some(0.0));
        assert_eq!(ProgressEvent::progress(f32::NAN).percent(), Some(0.0));
        assert_eq!(ProgressEvent::status("x", Some(101.0)).percent(), Some(100.0));
    }

    #[test]
    fn test_event_log_records() {
        let log = EventLog::new();
        log.emit(ProgressEvent::warning("w"));
        log.emit(ProgressEvent::error("e", None));
        log.emit(ProgressEvent::completed("done", false));

        assert_eq!(log.len(), 3);
        assert_eq!(log.warnings(), vec!["w".to_string()]);
        assert_eq!(log.errors(), vec!["e".to_string()]);
        assert_eq!(log.completions(), vec![false]);
    }

    #[test]
    fn test_closure_and_channel_sinks() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelSink::new(tx);
        sink.emit(ProgressEvent::progress(10.0));
        assert_eq!(rx.recv().unwrap(), ProgressEvent::progress(10.0));

        let counter = Arc::new(Mutex::new(0usize));
        let counted = counter.clone();
        let closure = move |_event: ProgressEvent| *counted.lock() += 1;
        closure.emit(ProgressEvent::warning("a"));
        closure.emit(ProgressEvent::warning("b"));
        assert_eq!(*counter.lock(), 2);
    }

    #[test]
    fn test_cancellation_token_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
        clone.reset();
        assert!(!token.is_cancelled());
    }
}
