// External collaborators of the round engine. Both live outside the
// core's transactional boundary: the provider is consulted once at
// tournament start, the sink once per competitor after finalization.

use async_trait::async_trait;
use shared::dto::player::PlayerDetailsDto;
use shared::dto::ratings::RatingSnapshotDto;
use shared::models::competitor::PlayerId;
use shared::Result;

/// Read side of the long-lived player-rating store. Failures surface as
/// `SharedError::Upstream`; the engine never retries on its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRatingProvider: Send + Sync {
    async fn fetch_details(&self, player_id: PlayerId) -> Result<PlayerDetailsDto>;
}

/// Write side of the player-rating store, fed one settled snapshot per
/// competitor. A failed push leaves the snapshot queued locally for
/// retry; the engine never recomputes for a retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingSink: Send + Sync {
    async fn push_rating(&self, snapshot: RatingSnapshotDto) -> Result<()>;
}
