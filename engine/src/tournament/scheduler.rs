use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration};

use crate::config::SchedulerConfig;
use crate::tournament::registry::TournamentRegistry;
use crate::tournament::usecase::{RoundAdvance, TournamentUseCase};

/// Background sweep that advances tournaments whose current round is
/// fully resolved. The timer lives here, not in the round lifecycle:
/// the core stays free of process-wide timer state and an embedding
/// binary decides whether to run the sweep at all.
#[derive(Clone)]
pub struct RoundScheduler<U: TournamentUseCase + 'static> {
    usecase: Arc<U>,
    registry: TournamentRegistry,
    sweep_interval: Duration,
    last_sweep: Arc<Mutex<Option<DateTime<Utc>>>>,
    is_running: bool,
}

impl<U: TournamentUseCase + 'static> RoundScheduler<U> {
    pub fn new(usecase: Arc<U>, registry: TournamentRegistry, config: &SchedulerConfig) -> Self {
        Self {
            usecase,
            registry,
            sweep_interval: Duration::from_secs(config.sweep_interval_seconds),
            last_sweep: Arc::new(Mutex::new(None)),
            is_running: false,
        }
    }

    /// Start the background sweep loop.
    pub fn start(&mut self) {
        if self.is_running {
            warn!("Round scheduler is already running");
            return;
        }
        self.is_running = true;
        info!(
            "Starting round-advance scheduler (every {:?})",
            self.sweep_interval
        );

        let usecase = self.usecase.clone();
        let registry = self.registry.clone();
        let last_sweep = self.last_sweep.clone();
        let interval = self.sweep_interval;

        tokio::spawn(async move {
            loop {
                Self::run_sweep(&usecase, &registry, &last_sweep).await;
                sleep(interval).await;
            }
        });
    }

    pub fn stop(&mut self) {
        self.is_running = false;
        info!("Stopping round-advance scheduler");
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn last_sweep(&self) -> Option<DateTime<Utc>> {
        *self.last_sweep.lock().unwrap()
    }

    /// One pass over every in-progress tournament; returns how many
    /// advanced. Also usable directly when embedding without the loop.
    pub async fn sweep_once(&self) -> usize {
        Self::run_sweep(&self.usecase, &self.registry, &self.last_sweep).await
    }

    async fn run_sweep(
        usecase: &Arc<U>,
        registry: &TournamentRegistry,
        last_sweep: &Arc<Mutex<Option<DateTime<Utc>>>>,
    ) -> usize {
        let mut advanced = 0;
        for tournament_id in registry.in_progress_ids().await {
            match usecase.advance_round(tournament_id).await {
                Ok(RoundAdvance::NextRound { round, .. }) => {
                    info!("sweep advanced tournament {tournament_id} to round {round}");
                    advanced += 1;
                }
                Ok(RoundAdvance::Finalized { snapshots }) => {
                    info!(
                        "sweep finalized tournament {tournament_id} ({} ratings)",
                        snapshots.len()
                    );
                    advanced += 1;
                }
                // An unresolved round is the normal case, not a fault.
                Err(err) if err.is_benign() => {
                    debug!("tournament {tournament_id} not ready to advance: {err}");
                }
                Err(err) => {
                    error!("sweep failed to advance tournament {tournament_id}: {err}");
                }
            }
        }
        *last_sweep.lock().unwrap() = Some(Utc::now());
        advanced
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            is_running: self.is_running,
            last_sweep: self.last_sweep(),
        }
    }
}

/// Status information for the round scheduler.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchedulerStatus {
    pub is_running: bool,
    pub last_sweep: Option<DateTime<Utc>>,
}
