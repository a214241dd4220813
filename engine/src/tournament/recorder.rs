use shared::models::competitor::MatchResult;
use shared::models::pairing::{MatchOutcome, PairingId, PairingStatus};
use shared::models::tournament::TournamentRunState;
use shared::{Result, SharedError};

/// Applies a match outcome to an unresolved two-sided pairing: points
/// and per-side results land in both participants' ledgers and the
/// pairing becomes immutable. The caller (the round lifecycle) has
/// already verified the pairing is open; this function still refuses
/// byes and outcomes naming a player outside the pairing.
pub fn apply_outcome(
    state: &mut TournamentRunState,
    pairing_id: PairingId,
    outcome: MatchOutcome,
) -> Result<()> {
    let pairing = state.pairing(pairing_id).ok_or_else(|| {
        SharedError::NotFound(format!(
            "pairing {pairing_id} does not exist in tournament {}",
            state.tournament_id
        ))
    })?;
    let round = pairing.round;
    let first = pairing.first;
    let second = pairing.second.ok_or_else(|| {
        SharedError::InvalidState(format!(
            "pairing {pairing_id} is a bye and cannot take an outcome"
        ))
    })?;

    let (first_result, second_result) = match outcome {
        MatchOutcome::Draw => (MatchResult::Draw, MatchResult::Draw),
        MatchOutcome::Decisive { winner } if winner == first => {
            (MatchResult::Win, MatchResult::Loss)
        }
        MatchOutcome::Decisive { winner } if winner == second => {
            (MatchResult::Loss, MatchResult::Win)
        }
        MatchOutcome::Decisive { winner } => {
            return Err(SharedError::NotFound(format!(
                "player {winner} is not part of pairing {pairing_id}"
            )))
        }
    };

    state.competitor_mut(first)?.apply_result(round, first_result)?;
    state.competitor_mut(second)?.apply_result(round, second_result)?;

    // Lookup cannot fail here; the id resolved above.
    if let Some(pairing) = state.pairing_mut(pairing_id) {
        pairing.status = PairingStatus::Completed;
        pairing.outcome = Some(outcome);
    }

    log::debug!(
        "tournament {}: pairing {pairing_id} round {round} resolved as {outcome:?}",
        state.tournament_id
    );
    Ok(())
}
