use shared::models::tournament::{TournamentId, TournamentRunState, TournamentStatus};
use shared::{Result, SharedError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// In-memory home of every live tournament run. Each run sits behind
/// its own mutex, so state transitions for one tournament serialize
/// while distinct tournaments proceed independently; no two tournaments
/// share mutable state.
#[derive(Clone, Default)]
pub struct TournamentRegistry {
    runs: Arc<RwLock<HashMap<TournamentId, Arc<Mutex<TournamentRunState>>>>>,
}

impl TournamentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh run. A second registration for the same id is
    /// the losing side of a concurrent start and is rejected.
    pub async fn create(
        &self,
        tournament_id: TournamentId,
        max_rounds: u32,
    ) -> Result<Arc<Mutex<TournamentRunState>>> {
        let mut runs = self.runs.write().await;
        if runs.contains_key(&tournament_id) {
            return Err(SharedError::InvalidState(format!(
                "tournament {tournament_id} already has a run"
            )));
        }
        let run = Arc::new(Mutex::new(TournamentRunState::new(tournament_id, max_rounds)));
        runs.insert(tournament_id, run.clone());
        Ok(run)
    }

    pub async fn get(&self, tournament_id: TournamentId) -> Result<Arc<Mutex<TournamentRunState>>> {
        let runs = self.runs.read().await;
        runs.get(&tournament_id).cloned().ok_or_else(|| {
            SharedError::NotFound(format!("tournament {tournament_id} has no run"))
        })
    }

    /// Drops a run, e.g. after its snapshots reached the rating store.
    pub async fn remove(&self, tournament_id: TournamentId) -> Result<()> {
        let mut runs = self.runs.write().await;
        runs.remove(&tournament_id).map(|_| ()).ok_or_else(|| {
            SharedError::NotFound(format!("tournament {tournament_id} has no run"))
        })
    }

    /// Ids of runs still in progress, for the periodic advance sweep.
    pub async fn in_progress_ids(&self) -> Vec<TournamentId> {
        let runs: Vec<(TournamentId, Arc<Mutex<TournamentRunState>>)> = {
            let guard = self.runs.read().await;
            guard.iter().map(|(id, run)| (*id, run.clone())).collect()
        };

        let mut ids = Vec::new();
        for (id, run) in runs {
            if run.lock().await.status == TournamentStatus::InProgress {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get_returns_same_run() {
        let registry = TournamentRegistry::new();
        registry.create(7, 3).await.unwrap();

        let run = registry.get(7).await.unwrap();
        assert_eq!(run.lock().await.max_rounds, 3);
    }

    #[tokio::test]
    async fn test_duplicate_create_is_invalid_state() {
        let registry = TournamentRegistry::new();
        registry.create(7, 3).await.unwrap();
        let err = registry.create(7, 5).await.unwrap_err();
        assert!(matches!(err, SharedError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_get_unknown_tournament_is_not_found() {
        let registry = TournamentRegistry::new();
        assert!(matches!(
            registry.get(99).await.unwrap_err(),
            SharedError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_in_progress_ids_skips_finalized_runs() {
        let registry = TournamentRegistry::new();
        let first = registry.create(1, 2).await.unwrap();
        let second = registry.create(2, 2).await.unwrap();

        first.lock().await.status = TournamentStatus::InProgress;
        second.lock().await.status = TournamentStatus::Finalized;

        assert_eq!(registry.in_progress_ids().await, vec![1]);
    }

    #[tokio::test]
    async fn test_remove_drops_the_run() {
        let registry = TournamentRegistry::new();
        registry.create(7, 3).await.unwrap();
        registry.remove(7).await.unwrap();
        assert!(registry.get(7).await.is_err());
        assert!(registry.remove(7).await.is_err());
    }
}
