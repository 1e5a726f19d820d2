//! Periodic refresh of the observation store
//!
//! Each cycle walks `Idle → Fetching → (Updating | Failed) → Idle`. Only one
//! cycle runs at a time; a tick or manual refresh arriving mid-cycle is skipped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::archive::ObservationArchive;
use crate::models::WeatherObservation;
use crate::store::ObservationStore;
use crate::weather::FeedFetcher;
use crate::{DeliveryFeeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshState {
    Idle,
    Fetching,
    Updating,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum CycleOutcome {
    Updated { stations: usize },
    Failed { reason: String },
    Skipped,
}

pub struct RefreshScheduler {
    fetcher: Arc<dyn FeedFetcher>,
    store: Arc<ObservationStore>,
    archive: Option<Arc<dyn ObservationArchive>>,
    period: Duration,
    align_to_minute: Option<u32>,
    cycle: tokio::sync::Mutex<()>,
    state: Mutex<RefreshState>,
    last_outcome: Mutex<Option<CycleOutcome>>,
    completed_cycles: AtomicU64,
    started: AtomicBool,
}

impl RefreshScheduler {
    /// Fails with a configuration error if `period` is zero.
    pub fn new(
        fetcher: Arc<dyn FeedFetcher>,
        store: Arc<ObservationStore>,
        period: Duration,
    ) -> Result<Self> {
        if period.is_zero() {
            return Err(DeliveryFeeError::config("Refresh period must be non-zero"));
        }

        Ok(Self {
            fetcher,
            store,
            archive: None,
            period,
            align_to_minute: None,
            cycle: tokio::sync::Mutex::new(()),
            state: Mutex::new(RefreshState::Idle),
            last_outcome: Mutex::new(None),
            completed_cycles: AtomicU64::new(0),
            started: AtomicBool::new(false),
        })
    }

    /// Publish every refreshed observation to `archive`
    #[must_use]
    pub fn with_archive(mut self, archive: Arc<dyn ObservationArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Delay the first periodic cycle until `minute` past the next hour
    #[must_use]
    pub fn with_alignment(mut self, minute: Option<u32>) -> Self {
        self.align_to_minute = minute;
        self
    }

    #[must_use]
    pub fn state(&self) -> RefreshState {
        *self.state.lock()
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<CycleOutcome> {
        self.last_outcome.lock().clone()
    }

    /// Number of cycles that ran to completion, successful or not
    #[must_use]
    pub fn completed_cycles(&self) -> u64 {
        self.completed_cycles.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Run one fetch-and-update cycle unless one is already in flight.
    ///
    /// A failed fetch leaves the store untouched. Archive failures are logged and
    /// never undo the store update.
    pub async fn refresh_now(&self) -> CycleOutcome {
        let Ok(_guard) = self.cycle.try_lock() else {
            debug!("Refresh already in progress, skipping");
            return CycleOutcome::Skipped;
        };

        self.set_state(RefreshState::Fetching);
        let outcome = match self.fetcher.fetch().await {
            Ok(observations) => {
                self.set_state(RefreshState::Updating);
                let archived = observations.clone();
                let stations = self.store.update_from(observations);
                self.spawn_archive(archived);
                info!("Weather observations refreshed for {} stations", stations);
                CycleOutcome::Updated { stations }
            }
            Err(e) => {
                self.set_state(RefreshState::Failed);
                warn!("Weather refresh failed: {}", e);
                CycleOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        self.completed_cycles.fetch_add(1, Ordering::Relaxed);
        *self.last_outcome.lock() = Some(outcome.clone());
        self.set_state(RefreshState::Idle);
        outcome
    }

    /// Start the periodic loop.
    ///
    /// Returns `None` if the loop is already running.
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Refresh scheduler already running");
            return None;
        }

        let delay = self
            .align_to_minute
            .map(|minute| initial_delay(Utc::now(), minute))
            .unwrap_or(Duration::ZERO);
        info!(
            "Starting weather refresh every {:?}, first run in {:?}",
            self.period, delay
        );

        let scheduler = Arc::clone(self);
        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut ticker = tokio::time::interval(scheduler.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                scheduler.refresh_now().await;
            }
        }))
    }

    fn set_state(&self, state: RefreshState) {
        *self.state.lock() = state;
    }

    fn spawn_archive(&self, observations: Vec<WeatherObservation>) {
        let Some(archive) = &self.archive else {
            return;
        };
        for observation in observations {
            let archive = Arc::clone(archive);
            tokio::spawn(async move {
                if let Err(e) = archive.archive(&observation).await {
                    warn!(
                        "Failed to archive observation for {}: {}",
                        observation.station_name, e
                    );
                }
            });
        }
    }
}

/// Time from `now` until `minute` past the start of the next hour
#[must_use]
pub fn initial_delay(now: DateTime<Utc>, minute: u32) -> Duration {
    const HOUR_MILLIS: i64 = 60 * 60 * 1000;

    let now_millis = now.timestamp_millis();
    let next_hour = now_millis - now_millis.rem_euclid(HOUR_MILLIS) + HOUR_MILLIS;
    let target = next_hour + i64::from(minute) * 60 * 1000;

    Duration::from_millis(u64::try_from(target - now_millis).unwrap_or_default())
}
