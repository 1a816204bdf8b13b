//! Notification sink: the injected replacement for ad-hoc toast/alert
//! side effects. Surfaces decide how a notice reaches the user; the
//! controller only emits them.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-facing notification produced by a session operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Capability for surfacing notices to the user.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Sink that queues notices for an event loop to drain once per frame.
/// Used by the TUI to feed its status bar.
#[derive(Debug, Default)]
pub struct QueueSink {
    queue: Mutex<VecDeque<Notice>>,
}

impl QueueSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all queued notices, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        match self.queue.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl NotificationSink for QueueSink {
    fn notify(&self, notice: Notice) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(notice);
        }
    }
}

/// Sink that discards every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _notice: Notice) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_sink_drains_in_order() {
        let sink = QueueSink::new();
        sink.notify(Notice::info("one"));
        sink.notify(Notice::error("two"));

        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].text, "one");
        assert_eq!(drained[0].level, NoticeLevel::Info);
        assert_eq!(drained[1].level, NoticeLevel::Error);

        assert!(sink.drain().is_empty());
    }
}
