use crate::models::competitor::PlayerId;
use serde::{Deserialize, Serialize};

pub type PairingId = u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PairingStatus {
    /// Pairing produced, outcome not yet recorded.
    Scheduled,
    /// Outcome recorded; immutable from here on.
    Completed,
    /// Single-competitor pairing, resolved as a win at creation time.
    Bye,
}

/// Outcome of a completed pairing. The losing side is implied by the
/// winner; a draw has no winner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchOutcome {
    Decisive { winner: PlayerId },
    Draw,
}

/// A single pairing within one round. `second` is `None` for a bye.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundPairing {
    pub id: PairingId,
    pub round: u32,
    pub first: PlayerId,
    pub second: Option<PlayerId>,
    pub status: PairingStatus,
    pub outcome: Option<MatchOutcome>,
}

impl RoundPairing {
    pub fn new_pair(id: PairingId, round: u32, first: PlayerId, second: PlayerId) -> Self {
        Self {
            id,
            round,
            first,
            second: Some(second),
            status: PairingStatus::Scheduled,
            outcome: None,
        }
    }

    pub fn new_bye(id: PairingId, round: u32, player: PlayerId) -> Self {
        Self {
            id,
            round,
            first: player,
            second: None,
            status: PairingStatus::Bye,
            outcome: Some(MatchOutcome::Decisive { winner: player }),
        }
    }

    pub fn is_bye(&self) -> bool {
        self.second.is_none()
    }

    pub fn is_resolved(&self) -> bool {
        self.status != PairingStatus::Scheduled
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.first == player || self.second == Some(player)
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        if self.first == player {
            self.second
        } else if self.second == Some(player) {
            Some(self.first)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::competitor::MatchResult;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(MatchResult::Win, 1.0)]
    #[case(MatchResult::Draw, 0.5)]
    #[case(MatchResult::Loss, 0.0)]
    fn test_result_score_and_points_agree(#[case] result: MatchResult, #[case] expected: f64) {
        assert_eq!(result.score(), expected);
        assert_eq!(result.points(), expected);
    }

    #[test]
    fn test_pair_starts_unresolved() {
        let pairing = RoundPairing::new_pair(1, 1, 10, 20);
        assert_eq!(pairing.status, PairingStatus::Scheduled);
        assert!(!pairing.is_resolved());
        assert!(!pairing.is_bye());
        assert!(pairing.involves(10) && pairing.involves(20));
        assert!(!pairing.involves(30));
    }

    #[test]
    fn test_bye_is_resolved_at_creation() {
        let bye = RoundPairing::new_bye(3, 2, 10);
        assert!(bye.is_bye());
        assert!(bye.is_resolved());
        assert_eq!(bye.outcome, Some(MatchOutcome::Decisive { winner: 10 }));
    }

    #[test]
    fn test_opponent_lookup() {
        let pairing = RoundPairing::new_pair(1, 1, 10, 20);
        assert_eq!(pairing.opponent_of(10), Some(20));
        assert_eq!(pairing.opponent_of(20), Some(10));
        assert_eq!(pairing.opponent_of(30), None);

        let bye = RoundPairing::new_bye(2, 1, 10);
        assert_eq!(bye.opponent_of(10), None);
    }
}
