use crate::models::competitor::{Competitor, PlayerId};
use crate::models::pairing::{PairingId, RoundPairing};
use crate::{Result, SharedError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

pub type TournamentId = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TournamentStatus {
    NotStarted,
    InProgress,
    Finalized,
}

/// Admission requirements checked against player details at tournament
/// start. `required_gender` of `None` or `"ANY"` admits everyone.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TournamentRules {
    #[validate(range(min = 0.0, message = "minimum rating must not be negative"))]
    pub min_rating: f64,
    #[validate(range(min = 0.0, message = "maximum rating must not be negative"))]
    pub max_rating: f64,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub required_gender: Option<String>,
}

impl Default for TournamentRules {
    fn default() -> Self {
        Self {
            min_rating: 0.0,
            max_rating: 4000.0,
            min_age: None,
            max_age: None,
            required_gender: None,
        }
    }
}

impl TournamentRules {
    pub fn validate_fields(&self) -> Result<()> {
        self.validate()?;
        if self.min_rating > self.max_rating {
            return Err(SharedError::Validation(format!(
                "rating band is empty: min {} > max {}",
                self.min_rating, self.max_rating
            )));
        }
        if let (Some(min), Some(max)) = (self.min_age, self.max_age) {
            if min > max {
                return Err(SharedError::Validation(format!(
                    "age band is empty: min {min} > max {max}"
                )));
            }
        }
        Ok(())
    }
}

/// A competitor's settled rating for one tournament, computed at
/// finalization. `pushed` tracks the second phase of settlement: the
/// snapshot survives locally until the rating store accepted it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingSnapshot {
    pub player_id: PlayerId,
    pub tournament_id: TournamentId,
    pub rating: f64,
    pub rating_deviation: f64,
    pub volatility: f64,
    pub points: f64,
    pub computed_at: DateTime<Utc>,
    pub pushed: bool,
}

/// The whole mutable state of one tournament run: competitors and
/// pairings live in arenas keyed by id, never as cyclic references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentRunState {
    pub tournament_id: TournamentId,
    pub current_round: u32,
    pub max_rounds: u32,
    pub status: TournamentStatus,
    pub competitors: BTreeMap<PlayerId, Competitor>,
    pub pairings: Vec<RoundPairing>,
    pub snapshots: Vec<RatingSnapshot>,
    pub started_at: Option<DateTime<Utc>>,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl TournamentRunState {
    pub fn new(tournament_id: TournamentId, max_rounds: u32) -> Self {
        Self {
            tournament_id,
            current_round: 0,
            max_rounds,
            status: TournamentStatus::NotStarted,
            competitors: BTreeMap::new(),
            pairings: Vec::new(),
            snapshots: Vec::new(),
            started_at: None,
            finalized_at: None,
        }
    }

    /// Pairing ids are 1-based positions in the arena.
    pub fn next_pairing_id(&self) -> PairingId {
        self.pairings.len() as PairingId + 1
    }

    pub fn pairing(&self, id: PairingId) -> Option<&RoundPairing> {
        id.checked_sub(1).and_then(|idx| self.pairings.get(idx as usize))
    }

    pub fn pairing_mut(&mut self, id: PairingId) -> Option<&mut RoundPairing> {
        id.checked_sub(1)
            .and_then(|idx| self.pairings.get_mut(idx as usize))
    }

    pub fn round_pairings(&self, round: u32) -> impl Iterator<Item = &RoundPairing> {
        self.pairings.iter().filter(move |p| p.round == round)
    }

    pub fn round_resolved(&self, round: u32) -> bool {
        self.round_pairings(round).all(|p| p.is_resolved())
    }

    pub fn all_rounds_resolved(&self) -> bool {
        self.pairings.iter().all(|p| p.is_resolved())
    }

    pub fn competitor(&self, player_id: PlayerId) -> Result<&Competitor> {
        self.competitors.get(&player_id).ok_or_else(|| {
            SharedError::NotFound(format!(
                "player {player_id} is not part of tournament {}",
                self.tournament_id
            ))
        })
    }

    pub fn competitor_mut(&mut self, player_id: PlayerId) -> Result<&mut Competitor> {
        let tournament_id = self.tournament_id;
        self.competitors.get_mut(&player_id).ok_or_else(|| {
            SharedError::NotFound(format!(
                "player {player_id} is not part of tournament {tournament_id}"
            ))
        })
    }

    pub fn active_competitors(&self) -> Vec<&Competitor> {
        self.competitors.values().filter(|c| c.is_active()).collect()
    }
}
