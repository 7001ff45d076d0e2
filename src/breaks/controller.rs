use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::Utc;
use log::debug;
use serde::Serialize;
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{log_info, log_warn};

use super::{BreakError, BreakTimerState, TickOutcome, BREAK_DURATION_SECS};

const ENABLE_LOGS: bool = true;
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BreakEvent {
    Started { seconds_remaining: u32 },
    Tick { seconds_remaining: u32 },
    Completed,
    Stopped,
}

#[derive(Debug, Serialize, Clone)]
pub struct BreakSnapshot {
    pub state: BreakTimerState,
    pub display: String,
}

struct Ticker {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Shared pieces of the scheduler, cloned into the background tasks.
#[derive(Clone)]
struct Core {
    state: Arc<Mutex<BreakTimerState>>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    events: broadcast::Sender<BreakEvent>,
    tick_interval: Duration,
    signal_primed: Arc<AtomicBool>,
    shutdown: CancellationToken,
}

/// Drives the break countdown: Idle until started, then one tick per
/// interval until the countdown runs out or the break is stopped.
///
/// Dropping the scheduler cancels the countdown and any attached start
/// signal listener.
pub struct BreakTimerScheduler {
    core: Core,
}

impl BreakTimerScheduler {
    pub fn new() -> Self {
        Self::with_timing(BREAK_DURATION_SECS, Duration::from_secs(1))
    }

    pub fn with_timing(duration_secs: u32, tick_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            core: Core {
                state: Arc::new(Mutex::new(BreakTimerState::new(duration_secs))),
                ticker: Arc::new(Mutex::new(None)),
                events,
                tick_interval,
                signal_primed: Arc::new(AtomicBool::new(false)),
                shutdown: CancellationToken::new(),
            },
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BreakEvent> {
        self.core.events.subscribe()
    }

    pub async fn get_state(&self) -> BreakTimerState {
        self.core.state.lock().await.clone()
    }

    pub async fn get_snapshot(&self) -> BreakSnapshot {
        let state = self.get_state().await;
        BreakSnapshot {
            display: state.display(),
            state,
        }
    }

    pub async fn start(&self) -> Result<BreakTimerState, BreakError> {
        self.core.start().await
    }

    pub async fn stop(&self) -> Result<BreakTimerState, BreakError> {
        self.core.stop().await
    }

    /// Handle one observation of the external start counter. The first
    /// observation only primes the scheduler; later ones start a break when
    /// idle. Returns whether a break was started.
    pub async fn observe_start_signal(&self, counter: u64) -> bool {
        self.core.observe_start_signal(counter).await
    }

    /// Follow an external start counter. Its value at attach time counts as
    /// the first observation; only later increments start a break.
    pub fn attach_start_signal(&self, mut signal: watch::Receiver<u64>) -> JoinHandle<()> {
        let initial = *signal.borrow_and_update();
        self.core.prime(initial);

        let core = self.core.clone();
        let token = self.core.shutdown.child_token();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = signal.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let counter = *signal.borrow_and_update();
                        core.observe_start_signal(counter).await;
                    }
                }
            }
        })
    }
}

impl Default for BreakTimerScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BreakTimerScheduler {
    fn drop(&mut self) {
        self.core.shutdown.cancel();
    }
}

impl Core {
    async fn start(&self) -> Result<BreakTimerState, BreakError> {
        let run_id = Uuid::new_v4();
        let snapshot = {
            let mut state = self.state.lock().await;
            state.begin(run_id, Utc::now())?;
            state.clone()
        };

        self.spawn_ticker(run_id).await;

        log_info!("Break started ({}s)", snapshot.seconds_remaining);
        let _ = self.events.send(BreakEvent::Started {
            seconds_remaining: snapshot.seconds_remaining,
        });

        Ok(snapshot)
    }

    async fn stop(&self) -> Result<BreakTimerState, BreakError> {
        let snapshot = {
            let mut state = self.state.lock().await;
            if !state.is_running() {
                return Err(BreakError::NotRunning);
            }
            state.reset();
            state.clone()
        };

        self.cancel_ticker().await;

        log_info!("Break stopped by user");
        let _ = self.events.send(BreakEvent::Stopped);

        Ok(snapshot)
    }

    /// Returns true when this call consumed the initial observation.
    fn prime(&self, counter: u64) -> bool {
        let first = !self.signal_primed.swap(true, Ordering::SeqCst);
        if first {
            debug!("Initial break start signal {counter} observed; not starting");
        }
        first
    }

    async fn observe_start_signal(&self, counter: u64) -> bool {
        if self.prime(counter) {
            return false;
        }

        match self.start().await {
            Ok(_) => true,
            Err(err) => {
                log_warn!("Ignoring break start signal {counter}: {err}");
                false
            }
        }
    }

    async fn spawn_ticker(&self, run_id: Uuid) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(previous) = ticker_guard.take() {
            previous.token.cancel();
            previous.handle.abort();
        }

        let state = self.state.clone();
        let events = self.events.clone();
        let tick_interval = self.tick_interval;
        let token = self.shutdown.child_token();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + tick_interval, tick_interval);
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let outcome = {
                    let mut guard = state.lock().await;
                    if task_token.is_cancelled() || guard.run_id != Some(run_id) {
                        break;
                    }
                    guard.tick()
                };

                match outcome {
                    Some(TickOutcome::Counting(seconds_remaining)) => {
                        let _ = events.send(BreakEvent::Tick { seconds_remaining });
                    }
                    Some(TickOutcome::Completed) => {
                        log_info!("Break completed");
                        let _ = events.send(BreakEvent::Completed);
                        break;
                    }
                    None => break,
                }
            }
        });

        *ticker_guard = Some(Ticker { token, handle });
    }

    async fn cancel_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.token.cancel();
            ticker.handle.abort();
        }
    }
}
