use shared::dto::player::PlayerDetailsDto;
use shared::models::tournament::TournamentRules;
use shared::{Result, SharedError};

/// Checks a player's fetched details against the tournament's admission
/// rules. Runs once per seed at tournament start; a failure rejects the
/// whole roster so the caller can correct it and re-issue.
pub fn check_eligibility(details: &PlayerDetailsDto, rules: &TournamentRules) -> Result<()> {
    let player_id = details.player_id;

    if details.blacklisted {
        return Err(SharedError::Validation(format!(
            "player {player_id} is blacklisted from tournaments"
        )));
    }

    if details.rating < rules.min_rating || details.rating > rules.max_rating {
        return Err(SharedError::Validation(format!(
            "player {player_id} rating {} is outside the band {}..{}",
            details.rating, rules.min_rating, rules.max_rating
        )));
    }

    if let Some(min_age) = rules.min_age {
        match details.age {
            Some(age) if age >= min_age => {}
            _ => {
                return Err(SharedError::Validation(format!(
                    "player {player_id} does not meet the minimum age of {min_age}"
                )))
            }
        }
    }

    if let Some(max_age) = rules.max_age {
        match details.age {
            Some(age) if age <= max_age => {}
            _ => {
                return Err(SharedError::Validation(format!(
                    "player {player_id} does not meet the maximum age of {max_age}"
                )))
            }
        }
    }

    if let Some(required) = rules.required_gender.as_deref() {
        if !required.eq_ignore_ascii_case("ANY") {
            let matches_requirement = details
                .gender
                .as_deref()
                .is_some_and(|gender| gender.eq_ignore_ascii_case(required));
            if !matches_requirement {
                return Err(SharedError::Validation(format!(
                    "player {player_id} does not meet the gender requirement"
                )));
            }
        }
    }

    Ok(())
}
