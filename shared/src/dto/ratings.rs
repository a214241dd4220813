use crate::models::competitor::PlayerId;
use crate::models::tournament::{RatingSnapshot, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The settled rating pushed back to the long-lived player-rating store,
/// one per competitor per finalized tournament. `points` carries the
/// player's tournament result alongside the new rating triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingSnapshotDto {
    pub player_id: PlayerId,
    pub tournament_id: TournamentId,
    pub rating: f64,
    pub rating_deviation: f64,
    pub volatility: f64,
    pub points: f64,
    pub computed_at: DateTime<Utc>,
}

impl From<&RatingSnapshot> for RatingSnapshotDto {
    fn from(snapshot: &RatingSnapshot) -> Self {
        Self {
            player_id: snapshot.player_id,
            tournament_id: snapshot.tournament_id,
            rating: snapshot.rating,
            rating_deviation: snapshot.rating_deviation,
            volatility: snapshot.volatility,
            points: snapshot.points,
            computed_at: snapshot.computed_at,
        }
    }
}
