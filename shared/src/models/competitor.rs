use crate::{Result, SharedError};
use serde::{Deserialize, Serialize};

pub type PlayerId = i64;

/// Per-side result of one round, as seen from the competitor's own ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchResult {
    Win,
    Loss,
    Draw,
}

impl MatchResult {
    /// Outcome score used by the rating engine: 1.0 win, 0.5 draw, 0.0 loss.
    pub fn score(self) -> f64 {
        match self {
            MatchResult::Win => 1.0,
            MatchResult::Draw => 0.5,
            MatchResult::Loss => 0.0,
        }
    }

    /// Points awarded for this result within the tournament standings.
    pub fn points(self) -> f64 {
        match self {
            MatchResult::Win => 1.0,
            MatchResult::Draw => 0.5,
            MatchResult::Loss => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CompetitorStatus {
    /// Currently participating and eligible for pairing.
    Active,
    /// Left the tournament; keeps the ledger but is excluded from pairing.
    Withdrawn,
}

/// One row of a competitor's round ledger. A bye is a round with no
/// opponent, so the ledger length always equals the rounds played.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundEntry {
    pub round: u32,
    pub opponent: Option<PlayerId>,
    pub result: Option<MatchResult>,
}

impl RoundEntry {
    pub fn is_resolved(&self) -> bool {
        self.result.is_some()
    }
}

/// A player's state within a single tournament run. The rating triple is
/// frozen at tournament start; rating settlement reads it, never the
/// live rating store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competitor {
    pub player_id: PlayerId,
    pub seed_rating: f64,
    pub seed_rating_deviation: f64,
    pub seed_volatility: f64,
    pub points: f64,
    pub status: CompetitorStatus,
    pub ledger: Vec<RoundEntry>,
}

impl Competitor {
    pub fn new(player_id: PlayerId, rating: f64, rating_deviation: f64, volatility: f64) -> Self {
        Self {
            player_id,
            seed_rating: rating,
            seed_rating_deviation: rating_deviation,
            seed_volatility: volatility,
            points: 0.0,
            status: CompetitorStatus::Active,
            ledger: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CompetitorStatus::Active
    }

    pub fn rounds_played(&self) -> u32 {
        self.ledger.len() as u32
    }

    /// Opponents actually faced so far; byes contribute nothing here.
    pub fn opponents(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.ledger.iter().filter_map(|entry| entry.opponent)
    }

    pub fn has_faced(&self, other: PlayerId) -> bool {
        self.opponents().any(|id| id == other)
    }

    /// Opens a ledger row for a freshly paired round.
    pub fn schedule_round(&mut self, round: u32, opponent: PlayerId) {
        self.ledger.push(RoundEntry {
            round,
            opponent: Some(opponent),
            result: None,
        });
    }

    /// Records a bye: a phantom round with no opponent, scored as a win.
    pub fn award_bye(&mut self, round: u32) {
        self.ledger.push(RoundEntry {
            round,
            opponent: None,
            result: Some(MatchResult::Win),
        });
        self.points += MatchResult::Win.points();
    }

    /// Resolves this competitor's open ledger row for `round` and awards
    /// the corresponding points. Points only ever accumulate.
    pub fn apply_result(&mut self, round: u32, result: MatchResult) -> Result<()> {
        let player_id = self.player_id;
        let entry = self
            .ledger
            .iter_mut()
            .find(|entry| entry.round == round)
            .ok_or_else(|| {
                SharedError::NotFound(format!(
                    "player {player_id} has no ledger entry for round {round}"
                ))
            })?;
        if entry.is_resolved() {
            return Err(SharedError::InvalidState(format!(
                "player {player_id} already has a result for round {round}"
            )));
        }
        entry.result = Some(result);
        self.points += result.points();
        Ok(())
    }
}
