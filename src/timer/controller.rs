use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    notify::{AlertGate, Notifier},
    settings::{SettingsStore, TimerSettings},
};
use crate::{log_debug, log_info};

use super::{PhaseTimer, TimerEvent, TimerState};

const ENABLE_LOGS: bool = true;
const EVENT_BUFFER: usize = 64;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub settings: TimerSettings,
}

struct Ticker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl Ticker {
    fn is_live(&self) -> bool {
        !self.cancel_token.is_cancelled() && !self.handle.is_finished()
    }

    fn stop(self) {
        self.cancel_token.cancel();
    }
}

/// Drives a [`PhaseTimer`] from a one-second ticker and fans its events out
/// to subscribers.
///
/// Commands take the ticker lock before the engine lock, so at most one
/// ticker exists and it always matches the engine's running flag. The ticker
/// itself only takes the engine lock.
#[derive(Clone)]
pub struct TimerController {
    engine: Arc<Mutex<PhaseTimer>>,
    settings: Arc<SettingsStore>,
    alerts: Arc<AlertGate>,
    events: broadcast::Sender<TimerEvent>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    tick_interval: Duration,
    heartbeat_every_ticks: u32,
}

impl TimerController {
    pub fn new(settings: Arc<SettingsStore>, notifier: Arc<dyn Notifier>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let engine = PhaseTimer::new(settings.timer_settings());

        Self {
            engine: Arc::new(Mutex::new(engine)),
            settings,
            alerts: Arc::new(AlertGate::new(notifier)),
            events,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
            heartbeat_every_ticks: 1,
        }
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// A heartbeat goes out every `ticks` ticks; zero is treated as one.
    pub fn with_heartbeat_every(mut self, ticks: u32) -> Self {
        self.heartbeat_every_ticks = ticks.max(1);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    pub async fn get_state(&self) -> TimerState {
        self.engine.lock().await.state()
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        let guard = self.engine.lock().await;
        TimerSnapshot {
            state: guard.state(),
            settings: guard.settings(),
        }
    }

    pub async fn start(&self) -> TimerState {
        self.command(PhaseTimer::start).await
    }

    pub async fn pause(&self) -> TimerState {
        self.command(PhaseTimer::pause).await
    }

    pub async fn toggle(&self) -> TimerState {
        self.command(PhaseTimer::toggle).await
    }

    pub async fn reset(&self) -> TimerState {
        self.command(PhaseTimer::reset).await
    }

    pub async fn skip(&self) -> TimerState {
        self.command(|engine| {
            let next = engine.skip();
            log_info!("Skipped to {} phase", next);
        })
        .await
    }

    /// Validates, applies and persists new settings. Returns `Ok(false)`
    /// without touching anything while the timer is running.
    pub async fn apply_settings(&self, settings: TimerSettings) -> Result<bool> {
        settings.validate()?;

        let _ticker_guard = self.ticker.lock().await;
        let applied = {
            let mut engine = self.engine.lock().await;
            engine.apply_settings(settings)
        };

        if !applied {
            log_debug!("Ignoring settings change while the timer is running");
            return Ok(false);
        }

        let store = self.settings.clone();
        tokio::task::spawn_blocking(move || store.update_timer_settings(settings))
            .await
            .map_err(|err| anyhow!("settings writer task failed: {err}"))??;

        log_info!("Applied timer settings {:?}", settings);
        Ok(true)
    }

    async fn command<F>(&self, apply: F) -> TimerState
    where
        F: FnOnce(&mut PhaseTimer),
    {
        let mut ticker_guard = self.ticker.lock().await;
        let (state, events) = {
            let mut engine = self.engine.lock().await;
            apply(&mut *engine);
            (engine.state(), engine.drain_events())
        };

        dispatch(&self.events, &self.alerts, events);
        self.sync_ticker(&mut ticker_guard, state.is_running);
        state
    }

    fn sync_ticker(&self, ticker: &mut Option<Ticker>, running: bool) {
        if running {
            if !ticker.as_ref().is_some_and(Ticker::is_live) {
                if let Some(stale) = ticker.take() {
                    stale.stop();
                }
                *ticker = Some(self.spawn_ticker());
            }
        } else if let Some(active) = ticker.take() {
            active.stop();
        }
    }

    fn spawn_ticker(&self) -> Ticker {
        let engine = self.engine.clone();
        let events = self.events.clone();
        let alerts = self.alerts.clone();
        let tick_interval = self.tick_interval;
        let heartbeat_every = self.heartbeat_every_ticks;
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + tick_interval, tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks: u32 = 0;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let (state, transition, drained) = {
                    let mut guard = engine.lock().await;
                    if token.is_cancelled() {
                        break;
                    }
                    let transition = guard.tick();
                    if !guard.is_running() {
                        // Retire under the engine lock so the next start spawns a fresh ticker.
                        token.cancel();
                    }
                    (guard.state(), transition, guard.drain_events())
                };

                if let Some(next) = transition {
                    log_info!("Phase complete, next up: {}", next);
                }
                dispatch(&events, &alerts, drained);

                if !state.is_running {
                    break;
                }

                ticks = ticks.wrapping_add(1);
                if ticks % heartbeat_every == 0 {
                    let _ = events.send(TimerEvent::Heartbeat {
                        phase: state.phase,
                        remaining_seconds: state.remaining_seconds,
                    });
                }
            }
        });

        Ticker {
            handle,
            cancel_token,
        }
    }
}

fn dispatch(events: &broadcast::Sender<TimerEvent>, alerts: &AlertGate, drained: Vec<TimerEvent>) {
    for event in drained {
        if let TimerEvent::Alert(alert) = &event {
            alerts.deliver(alert);
        }
        // No subscribers is fine; the host may not be listening.
        let _ = events.send(event);
    }
}
