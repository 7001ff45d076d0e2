use std::sync::Arc;

use tokio::sync::watch;

use crate::notify::{Notifier, ToastKind};

/// Shortcut buttons available from anywhere in the app.
///
/// "Take a break" bumps a counter that the break scheduler follows via
/// [`crate::breaks::BreakTimerScheduler::attach_start_signal`].
pub struct QuickActions {
    break_signal: watch::Sender<u64>,
    notifier: Arc<dyn Notifier>,
}

impl QuickActions {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let (break_signal, _) = watch::channel(0);
        Self {
            break_signal,
            notifier,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.break_signal.subscribe()
    }

    pub fn break_counter(&self) -> u64 {
        *self.break_signal.borrow()
    }

    pub fn start_assessment(&self) {
        self.notifier
            .notify("Starting your ergonomic assessment...", ToastKind::Info);
    }

    pub fn take_break(&self) -> u64 {
        self.break_signal.send_modify(|counter| *counter += 1);
        self.notifier.notify(
            "Time for a healthy break! Break timer started.",
            ToastKind::Success,
        );
        self.break_counter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaks::{BreakEvent, BreakTimerScheduler};
    use crate::notify::RecordingNotifier;
    use std::time::Duration;

    #[test]
    fn take_break_increments_and_notifies() {
        let notifier = Arc::new(RecordingNotifier::new());
        let actions = QuickActions::new(notifier.clone());

        assert_eq!(actions.take_break(), 1);
        assert_eq!(actions.take_break(), 2);
        actions.start_assessment();

        let messages = notifier.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].1, ToastKind::Success);
        assert_eq!(messages[2].0, "Starting your ergonomic assessment...");
    }

    #[tokio::test(start_paused = true)]
    async fn take_break_starts_an_attached_scheduler() {
        let actions = QuickActions::new(Arc::new(RecordingNotifier::new()));
        let scheduler = BreakTimerScheduler::new();
        let mut events = scheduler.subscribe();
        scheduler.attach_start_signal(actions.subscribe());

        actions.take_break();
        let event = tokio::time::timeout(Duration::from_secs(60), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, BreakEvent::Started { seconds_remaining: 300 });
    }
}
