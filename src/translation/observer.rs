/*!
 * Progress and status reporting for document translation.
 *
 * The walker and translator report through a `TranslationObserver` so the
 * same code drives a terminal progress bar, plain log output, or a test
 * recorder.
 */

use log::{error, info, warn};
use parking_lot::Mutex;

/// Receiver of progress signals emitted while a document is translated
///
/// Every method has a no-op default so implementors only override what they
/// display.
pub trait TranslationObserver: Send + Sync {
    /// A fragment is about to be translated
    fn on_status(&self, _message: &str) {}

    /// `done` of `total` fragments have been processed
    fn on_progress(&self, _done: usize, _total: usize) {}

    /// A fragment kept its original text after all attempts failed
    fn on_warning(&self, _message: &str) {}

    /// Writing a fragment back into the document failed
    fn on_error(&self, _message: &str) {}

    /// The walk is over; transient indicators should be cleared
    fn on_finish(&self) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TranslationObserver for NoopObserver {}

/// Observer that forwards everything to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl TranslationObserver for LogObserver {
    fn on_status(&self, message: &str) {
        info!("{}", message);
    }

    fn on_warning(&self, message: &str) {
        warn!("{}", message);
    }

    fn on_error(&self, message: &str) {
        error!("{}", message);
    }
}

/// A single recorded observer call
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent {
    Status(String),
    Progress { done: usize, total: usize },
    Warning(String),
    Error(String),
    Finish,
}

/// Observer that keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events in arrival order
    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events.lock().clone()
    }

    /// Status messages only
    pub fn statuses(&self) -> Vec<String> {
        self.filter(|event| match event {
            ObserverEvent::Status(message) => Some(message.clone()),
            _ => None,
        })
    }

    /// Warning messages only
    pub fn warnings(&self) -> Vec<String> {
        self.filter(|event| match event {
            ObserverEvent::Warning(message) => Some(message.clone()),
            _ => None,
        })
    }

    /// Error messages only
    pub fn errors(&self) -> Vec<String> {
        self.filter(|event| match event {
            ObserverEvent::Error(message) => Some(message.clone()),
            _ => None,
        })
    }

    /// Progress values in arrival order
    pub fn progress(&self) -> Vec<(usize, usize)> {
        self.filter(|event| match event {
            ObserverEvent::Progress { done, total } => Some((*done, *total)),
            _ => None,
        })
    }

    fn filter<T>(&self, pick: impl Fn(&ObserverEvent) -> Option<T>) -> Vec<T> {
        self.events.lock().iter().filter_map(pick).collect()
    }

    fn push(&self, event: ObserverEvent) {
        self.events.lock().push(event);
    }
}

impl TranslationObserver for RecordingObserver {
    fn on_status(&self, message: &str) {
        self.push(ObserverEvent::Status(message.to_string()));
    }

    fn on_progress(&self, done: usize, total: usize) {
        self.push(ObserverEvent::Progress { done, total });
    }

    fn on_warning(&self, message: &str) {
        self.push(ObserverEvent::Warning(message.to_string()));
    }

    fn on_error(&self, message: &str) {
        self.push(ObserverEvent::Error(message.to_string()));
    }

    fn on_finish(&self) {
        self.push(ObserverEvent::Finish);
    }
}
