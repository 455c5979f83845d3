//! User-facing notification sink.
//!
//! The catalog client reports failures (network loss, bad API key, rate
//! limiting, server errors) through this trait so the hosting
//! application can render them however it likes. The default sink
//! forwards to the tracing subscriber.

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Error,
    Warning,
}

/// Sink for user-visible notifications.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Default notifier that logs notices instead of rendering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Error => tracing::error!(notice = %message, "User notification"),
            NoticeLevel::Warning => tracing::warn!(notice = %message, "User notification"),
        }
    }
}
