use crate::models::competitor::{CompetitorStatus, PlayerId};
use crate::models::pairing::{MatchOutcome, PairingId, PairingStatus, RoundPairing};
use serde::{Deserialize, Serialize};

/// One row of the current standings, ranked by points then seed rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingDto {
    pub rank: u32,
    pub player_id: PlayerId,
    pub points: f64,
    pub rating: f64,
    pub rounds_played: u32,
    pub status: CompetitorStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingDto {
    pub id: PairingId,
    pub round: u32,
    pub first: PlayerId,
    pub second: Option<PlayerId>,
    pub status: PairingStatus,
    pub outcome: Option<MatchOutcome>,
}

impl From<&RoundPairing> for PairingDto {
    fn from(pairing: &RoundPairing) -> Self {
        Self {
            id: pairing.id,
            round: pairing.round,
            first: pairing.first,
            second: pairing.second,
            status: pairing.status,
            outcome: pairing.outcome,
        }
    }
}
