use crate::clients::{MockPlayerRatingProvider, MockRatingSink};
use crate::config::Config;
use crate::tournament::registry::TournamentRegistry;
use crate::tournament::scheduler::RoundScheduler;
use crate::tournament::usecase::{RoundAdvance, TournamentUseCase, TournamentUseCaseImpl};
use pretty_assertions::assert_eq;
use shared::dto::player::PlayerDetailsDto;
use shared::models::competitor::CompetitorStatus;
use shared::models::pairing::{MatchOutcome, PairingStatus};
use shared::models::tournament::TournamentRules;
use shared::SharedError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Usecase = TournamentUseCaseImpl<MockPlayerRatingProvider, MockRatingSink>;

/// Provider answering every player with the same seed triple, sink
/// accepting every push.
fn plain_usecase() -> Usecase {
    let mut provider = MockPlayerRatingProvider::new();
    provider
        .expect_fetch_details()
        .returning(|player_id| Ok(PlayerDetailsDto::with_rating(player_id, 1500.0, 200.0, 0.06)));
    let mut sink = MockRatingSink::new();
    sink.expect_push_rating().returning(|_| Ok(()));
    usecase_with(provider, sink)
}

fn usecase_with(provider: MockPlayerRatingProvider, sink: MockRatingSink) -> Usecase {
    TournamentUseCaseImpl::new(
        TournamentRegistry::new(),
        Arc::new(provider),
        Arc::new(sink),
        &Config::default(),
    )
}

#[tokio::test]
async fn test_start_pairs_the_first_round() {
    let usecase = plain_usecase();
    let pairings = usecase
        .start_tournament(1, 3, vec![10, 20, 30, 40], TournamentRules::default())
        .await
        .unwrap();

    assert_eq!(pairings.len(), 2);
    assert!(pairings.iter().all(|p| p.round == 1));
    assert!(pairings
        .iter()
        .all(|p| p.status == PairingStatus::Scheduled));
}

#[tokio::test]
async fn test_start_rejects_duplicate_seeds() {
    let usecase = plain_usecase();
    let err = usecase
        .start_tournament(1, 3, vec![10, 20, 10], TournamentRules::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SharedError::Validation(_)));
}

#[tokio::test]
async fn test_start_rejects_empty_roster_and_zero_rounds() {
    let usecase = plain_usecase();
    assert!(usecase
        .start_tournament(1, 3, vec![], TournamentRules::default())
        .await
        .is_err());
    assert!(usecase
        .start_tournament(1, 0, vec![10, 20], TournamentRules::default())
        .await
        .is_err());
}

#[tokio::test]
async fn test_second_start_is_invalid_state() {
    let usecase = plain_usecase();
    usecase
        .start_tournament(1, 3, vec![10, 20], TournamentRules::default())
        .await
        .unwrap();
    let err = usecase
        .start_tournament(1, 3, vec![10, 20], TournamentRules::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SharedError::InvalidState(_)));
}

#[tokio::test]
async fn test_blacklisted_seed_rejects_the_roster() {
    let mut provider = MockPlayerRatingProvider::new();
    provider.expect_fetch_details().returning(|player_id| {
        let mut details = PlayerDetailsDto::with_rating(player_id, 1500.0, 200.0, 0.06);
        details.blacklisted = player_id == 20;
        Ok(details)
    });
    let mut sink = MockRatingSink::new();
    sink.expect_push_rating().never();
    let usecase = usecase_with(provider, sink);

    let err = usecase
        .start_tournament(1, 3, vec![10, 20], TournamentRules::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SharedError::Validation(_)));
    // A rejected roster leaves no run behind.
    assert!(matches!(
        usecase.get_standings(1).await.unwrap_err(),
        SharedError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_provider_failure_propagates_as_upstream() {
    let mut provider = MockPlayerRatingProvider::new();
    provider
        .expect_fetch_details()
        .returning(|_| Err(SharedError::Upstream("player store timed out".into())));
    let mut sink = MockRatingSink::new();
    sink.expect_push_rating().never();
    let usecase = usecase_with(provider, sink);

    let err = usecase
        .start_tournament(1, 3, vec![10], TournamentRules::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SharedError::Upstream(_)));
}

#[tokio::test]
async fn test_record_on_unknown_ids_is_not_found() {
    let usecase = plain_usecase();
    assert!(matches!(
        usecase
            .record_match_outcome(9, 1, MatchOutcome::Draw)
            .await
            .unwrap_err(),
        SharedError::NotFound(_)
    ));

    usecase
        .start_tournament(1, 1, vec![10, 20], TournamentRules::default())
        .await
        .unwrap();
    assert!(matches!(
        usecase
            .record_match_outcome(1, 42, MatchOutcome::Draw)
            .await
            .unwrap_err(),
        SharedError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_second_record_fails_and_points_stand() {
    let usecase = plain_usecase();
    usecase
        .start_tournament(1, 2, vec![10, 20], TournamentRules::default())
        .await
        .unwrap();

    usecase
        .record_match_outcome(1, 1, MatchOutcome::Decisive { winner: 10 })
        .await
        .unwrap();
    let err = usecase
        .record_match_outcome(1, 1, MatchOutcome::Decisive { winner: 20 })
        .await
        .unwrap_err();
    assert!(matches!(err, SharedError::InvalidState(_)));

    let standings = usecase.get_standings(1).await.unwrap();
    assert_eq!(standings[0].player_id, 10);
    assert_eq!(standings[0].points, 1.0);
    assert_eq!(standings[1].points, 0.0);
}

#[tokio::test]
async fn test_advance_requires_a_resolved_round() {
    let usecase = plain_usecase();
    usecase
        .start_tournament(1, 2, vec![10, 20], TournamentRules::default())
        .await
        .unwrap();

    let err = usecase.advance_round(1).await.unwrap_err();
    assert!(matches!(err, SharedError::InvalidState(_)));
}

#[tokio::test]
async fn test_record_against_a_previous_round_is_invalid_state() {
    let usecase = plain_usecase();
    usecase
        .start_tournament(1, 2, vec![10, 20, 30, 40], TournamentRules::default())
        .await
        .unwrap();

    usecase
        .record_match_outcome(1, 1, MatchOutcome::Decisive { winner: 10 })
        .await
        .unwrap();
    usecase
        .record_match_outcome(1, 2, MatchOutcome::Draw)
        .await
        .unwrap();
    let advance = usecase.advance_round(1).await.unwrap();
    assert!(matches!(advance, RoundAdvance::NextRound { round: 2, .. }));

    // Pairing 1 belongs to round 1; round 2 is current now.
    let err = usecase
        .record_match_outcome(1, 1, MatchOutcome::Draw)
        .await
        .unwrap_err();
    assert!(matches!(err, SharedError::InvalidState(_)));
}

#[tokio::test]
async fn test_finalization_pushes_one_snapshot_per_competitor() {
    let mut provider = MockPlayerRatingProvider::new();
    provider
        .expect_fetch_details()
        .returning(|player_id| Ok(PlayerDetailsDto::with_rating(player_id, 1500.0, 200.0, 0.06)));
    let mut sink = MockRatingSink::new();
    sink.expect_push_rating().times(2).returning(|_| Ok(()));
    let usecase = usecase_with(provider, sink);

    usecase
        .start_tournament(1, 1, vec![10, 20], TournamentRules::default())
        .await
        .unwrap();
    usecase
        .record_match_outcome(1, 1, MatchOutcome::Decisive { winner: 20 })
        .await
        .unwrap();

    let advance = usecase.advance_round(1).await.unwrap();
    let RoundAdvance::Finalized { snapshots } = advance else {
        panic!("expected finalization after the last round");
    };
    assert_eq!(snapshots.len(), 2);
    let winner = snapshots.iter().find(|s| s.player_id == 20).unwrap();
    let loser = snapshots.iter().find(|s| s.player_id == 10).unwrap();
    assert!(winner.rating > 1500.0);
    assert!(loser.rating < 1500.0);

    // Finalize is guarded: a second advance is an error, not a no-op.
    let err = usecase.advance_round(1).await.unwrap_err();
    assert!(matches!(err, SharedError::InvalidState(_)));

    assert_eq!(usecase.get_snapshots(1).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_push_is_retriable_without_recompute() {
    let mut provider = MockPlayerRatingProvider::new();
    provider
        .expect_fetch_details()
        .returning(|player_id| Ok(PlayerDetailsDto::with_rating(player_id, 1500.0, 200.0, 0.06)));

    // First push attempt fails, everything after succeeds.
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_sink = calls.clone();
    let mut sink = MockRatingSink::new();
    sink.expect_push_rating().returning(move |_| {
        if calls_in_sink.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(SharedError::Upstream("rating store unavailable".into()))
        } else {
            Ok(())
        }
    });
    let usecase = usecase_with(provider, sink);

    usecase
        .start_tournament(1, 1, vec![10, 20], TournamentRules::default())
        .await
        .unwrap();
    usecase
        .record_match_outcome(1, 1, MatchOutcome::Draw)
        .await
        .unwrap();

    let err = usecase.advance_round(1).await.unwrap_err();
    assert!(matches!(err, SharedError::Upstream(_)));

    // Ratings were settled in phase one and survive the failed push.
    assert_eq!(usecase.get_snapshots(1).await.unwrap().len(), 2);

    let pushed = usecase.retry_rating_push(1).await.unwrap();
    assert_eq!(pushed, 2);
    assert_eq!(usecase.retry_rating_push(1).await.unwrap(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_withdrawn_player_sits_out_future_rounds() {
    let usecase = plain_usecase();
    usecase
        .start_tournament(1, 2, vec![10, 20, 30], TournamentRules::default())
        .await
        .unwrap();

    // Round 1: one board plus a bye for the lowest seed.
    let round_one = usecase.get_pairings(1, 1).await.unwrap();
    assert_eq!(round_one.len(), 2);
    usecase
        .record_match_outcome(1, 1, MatchOutcome::Decisive { winner: 10 })
        .await
        .unwrap();

    // The bye recipient already has a resolved round and may leave.
    usecase.withdraw_player(1, 30).await.unwrap();
    let err = usecase.withdraw_player(1, 30).await.unwrap_err();
    assert!(matches!(err, SharedError::InvalidState(_)));

    let advance = usecase.advance_round(1).await.unwrap();
    let RoundAdvance::NextRound { pairings, .. } = advance else {
        panic!("expected a second round");
    };
    assert_eq!(pairings.len(), 1);
    assert!(pairings[0].second.is_some());
    assert!(pairings[0].first != 30 && pairings[0].second != Some(30));

    let standings = usecase.get_standings(1).await.unwrap();
    let withdrawn = standings.iter().find(|s| s.player_id == 30).unwrap();
    assert_eq!(withdrawn.status, CompetitorStatus::Withdrawn);
}

#[tokio::test]
async fn test_withdraw_with_an_open_pairing_is_rejected() {
    let usecase = plain_usecase();
    usecase
        .start_tournament(1, 2, vec![10, 20], TournamentRules::default())
        .await
        .unwrap();

    let err = usecase.withdraw_player(1, 10).await.unwrap_err();
    assert!(matches!(err, SharedError::InvalidState(_)));
}

#[tokio::test]
async fn test_standings_rank_by_points_then_rating() {
    let mut provider = MockPlayerRatingProvider::new();
    provider.expect_fetch_details().returning(|player_id| {
        let rating = 1400.0 + player_id as f64;
        Ok(PlayerDetailsDto::with_rating(player_id, rating, 200.0, 0.06))
    });
    let mut sink = MockRatingSink::new();
    sink.expect_push_rating().returning(|_| Ok(()));
    let usecase = usecase_with(provider, sink);

    usecase
        .start_tournament(1, 2, vec![10, 20, 30, 40], TournamentRules::default())
        .await
        .unwrap();
    // Round 1 sorts by rating: (40 v 30), (20 v 10). Upsets both boards.
    usecase
        .record_match_outcome(1, 1, MatchOutcome::Decisive { winner: 30 })
        .await
        .unwrap();
    usecase
        .record_match_outcome(1, 2, MatchOutcome::Decisive { winner: 10 })
        .await
        .unwrap();

    let standings = usecase.get_standings(1).await.unwrap();
    assert_eq!(
        standings.iter().map(|s| s.player_id).collect::<Vec<_>>(),
        vec![30, 10, 40, 20]
    );
    assert_eq!(standings[0].rank, 1);
    assert_eq!(standings[0].points, 1.0);
    assert_eq!(standings[3].points, 0.0);
}

#[tokio::test]
async fn test_snapshots_unavailable_before_finalization() {
    let usecase = plain_usecase();
    usecase
        .start_tournament(1, 1, vec![10, 20], TournamentRules::default())
        .await
        .unwrap();
    let err = usecase.get_snapshots(1).await.unwrap_err();
    assert!(matches!(err, SharedError::InvalidState(_)));

    let err = usecase.retry_rating_push(1).await.unwrap_err();
    assert!(matches!(err, SharedError::InvalidState(_)));
}

#[tokio::test]
async fn test_unknown_round_of_pairings_is_not_found() {
    let usecase = plain_usecase();
    usecase
        .start_tournament(1, 2, vec![10, 20], TournamentRules::default())
        .await
        .unwrap();
    assert!(usecase.get_pairings(1, 1).await.is_ok());
    assert!(matches!(
        usecase.get_pairings(1, 2).await.unwrap_err(),
        SharedError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_sweep_advances_only_resolved_tournaments() {
    let usecase = Arc::new(plain_usecase());
    usecase
        .start_tournament(1, 1, vec![10, 20], TournamentRules::default())
        .await
        .unwrap();

    let scheduler = RoundScheduler::new(
        usecase.clone(),
        usecase.registry().clone(),
        &Config::default().scheduler,
    );

    // Unresolved round: the sweep skips it without treating it as a fault.
    assert_eq!(scheduler.sweep_once().await, 0);
    assert!(scheduler.last_sweep().is_some());

    usecase
        .record_match_outcome(1, 1, MatchOutcome::Draw)
        .await
        .unwrap();
    assert_eq!(scheduler.sweep_once().await, 1);
    assert_eq!(usecase.get_snapshots(1).await.unwrap().len(), 2);

    // Finalized tournaments drop out of the sweep set.
    assert_eq!(scheduler.sweep_once().await, 0);
}
