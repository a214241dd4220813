pub mod models {
    pub mod competitor;
    pub mod pairing;
    pub mod tournament;
}

pub mod dto {
    pub mod player;
    pub mod ratings;
    pub mod tournament;
}

pub mod error;

// Re-export commonly used items
pub use error::{Result, SharedError};

// Re-export models
pub use models::{
    competitor::{Competitor, CompetitorStatus, MatchResult, PlayerId, RoundEntry},
    pairing::{MatchOutcome, PairingId, PairingStatus, RoundPairing},
    tournament::{
        RatingSnapshot, TournamentId, TournamentRules, TournamentRunState, TournamentStatus,
    },
};

// Re-export DTOs
pub use dto::{
    player::PlayerDetailsDto,
    ratings::RatingSnapshotDto,
    tournament::{PairingDto, StandingDto},
};
