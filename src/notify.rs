use std::sync::Mutex;

use log::{info, warn};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

/// Fire-and-forget user notifications. Implementations must not panic and
/// callers never inspect the outcome.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: ToastKind);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, kind: ToastKind) {
        match kind {
            ToastKind::Error | ToastKind::Warning => warn!("[toast:{kind:?}] {message}"),
            ToastKind::Success | ToastKind::Info => info!("[toast:{kind:?}] {message}"),
        }
    }
}

/// Keeps every notification in memory, for inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, ToastKind)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(String, ToastKind)> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, kind: ToastKind) {
        let mut guard = match self.messages.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push((message.to_string(), kind));
    }
}
