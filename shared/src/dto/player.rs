use crate::models::competitor::PlayerId;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Player details fetched from the player-rating store when a tournament
/// starts: the current rating triple plus the fields the eligibility
/// gate needs.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlayerDetailsDto {
    pub player_id: PlayerId,

    #[validate(range(min = 0.0, message = "rating must not be negative"))]
    pub rating: f64,

    #[validate(range(
        min = 0.000001,
        message = "rating deviation must be positive"
    ))]
    pub rating_deviation: f64,

    #[validate(range(min = 0.000001, message = "volatility must be positive"))]
    pub volatility: f64,

    pub blacklisted: bool,
    pub age: Option<u32>,
    pub gender: Option<String>,
}

impl PlayerDetailsDto {
    /// A plain, eligible player with the given rating triple.
    pub fn with_rating(player_id: PlayerId, rating: f64, rating_deviation: f64, volatility: f64) -> Self {
        Self {
            player_id,
            rating,
            rating_deviation,
            volatility,
            blacklisted: false,
            age: None,
            gender: None,
        }
    }
}
