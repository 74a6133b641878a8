//! Minimal `Append` implementations shared across the integration tests.
//! Not part of the crate's public API — concrete appenders are an external
//! collaborator's concern, but the dispatch engine still needs *something*
//! to observe in these end-to-end tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use loghier::appender_set::Append;
use loghier::event::LoggingEvent;

/// Counts how many times it was invoked. Used to assert on the *shape* of a
/// dispatch walk (which appenders fired, how many times) without caring
/// about message content.
#[derive(Debug)]
pub struct CountingAppender {
    name: String,
    count: AtomicUsize,
}

impl CountingAppender {
    pub fn new(name: impl Into<String>) -> CountingAppender {
        CountingAppender {
            name: name.into(),
            count: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Append for CountingAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn append(&self, _event: &LoggingEvent) -> anyhow::Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Records every message it receives, in order. Used to assert on *content*
/// and ordering, not just invocation count.
#[derive(Debug)]
pub struct RecordingAppender {
    name: String,
    messages: Mutex<Vec<String>>,
}

impl RecordingAppender {
    pub fn new(name: impl Into<String>) -> RecordingAppender {
        RecordingAppender {
            name: name.into(),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Append for RecordingAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn append(&self, event: &LoggingEvent) -> anyhow::Result<()> {
        self.messages.lock().unwrap().push(event.message().to_string());
        Ok(())
    }
}

/// An appender that always fails, to exercise §7's "an appender's `append`
/// threw" recovery path: the error is recorded on the hierarchy and dispatch
/// continues with the next appender.
#[derive(Debug)]
pub struct FailingAppender {
    name: String,
}

impl FailingAppender {
    pub fn new(name: impl Into<String>) -> FailingAppender {
        FailingAppender { name: name.into() }
    }
}

impl Append for FailingAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn append(&self, _event: &LoggingEvent) -> anyhow::Result<()> {
        anyhow::bail!("{} always fails", self.name)
    }
}
