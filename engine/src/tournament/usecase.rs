use crate::clients::{PlayerRatingProvider, RatingSink};
use crate::config::Config;
use crate::pairing::swiss::{self, pair_round, PairingPolicy};
use crate::ratings::glicko::{compute_rating, Glicko2Params, OpponentSample, RatingState};
use crate::tournament::eligibility::check_eligibility;
use crate::tournament::recorder;
use crate::tournament::registry::TournamentRegistry;
use async_trait::async_trait;
use chrono::Utc;
use shared::dto::ratings::RatingSnapshotDto;
use shared::dto::tournament::{PairingDto, StandingDto};
use shared::models::competitor::{Competitor, CompetitorStatus, PlayerId};
use shared::models::pairing::{MatchOutcome, PairingId, RoundPairing};
use shared::models::tournament::{
    RatingSnapshot, TournamentId, TournamentRules, TournamentRunState, TournamentStatus,
};
use shared::{Result, SharedError};
use std::collections::HashSet;
use std::sync::Arc;
use validator::Validate;

/// What a successful `advance_round` did.
#[derive(Debug, Clone)]
pub enum RoundAdvance {
    /// A further round was paired and is now awaiting results.
    NextRound {
        round: u32,
        pairings: Vec<PairingDto>,
    },
    /// The final round was done: ratings are settled and pushed.
    Finalized { snapshots: Vec<RatingSnapshotDto> },
}

/// The round lifecycle exposed to the orchestrating layer. Any
/// transport (HTTP, RPC, an in-process call) may sit in front of this.
#[async_trait]
pub trait TournamentUseCase: Send + Sync {
    async fn start_tournament(
        &self,
        tournament_id: TournamentId,
        max_rounds: u32,
        seeds: Vec<PlayerId>,
        rules: TournamentRules,
    ) -> Result<Vec<PairingDto>>;

    async fn record_match_outcome(
        &self,
        tournament_id: TournamentId,
        pairing_id: PairingId,
        outcome: MatchOutcome,
    ) -> Result<()>;

    async fn advance_round(&self, tournament_id: TournamentId) -> Result<RoundAdvance>;

    async fn withdraw_player(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> Result<()>;

    async fn get_standings(&self, tournament_id: TournamentId) -> Result<Vec<StandingDto>>;

    async fn get_pairings(
        &self,
        tournament_id: TournamentId,
        round: u32,
    ) -> Result<Vec<PairingDto>>;

    async fn get_snapshots(&self, tournament_id: TournamentId)
        -> Result<Vec<RatingSnapshotDto>>;

    async fn retry_rating_push(&self, tournament_id: TournamentId) -> Result<usize>;
}

pub struct TournamentUseCaseImpl<P, S> {
    registry: TournamentRegistry,
    provider: Arc<P>,
    sink: Arc<S>,
    params: Glicko2Params,
    policy: PairingPolicy,
}

impl<P: PlayerRatingProvider, S: RatingSink> TournamentUseCaseImpl<P, S> {
    pub fn new(
        registry: TournamentRegistry,
        provider: Arc<P>,
        sink: Arc<S>,
        config: &Config,
    ) -> Self {
        Self {
            registry,
            provider,
            sink,
            params: config.ratings.params(),
            policy: config.pairing.policy(),
        }
    }

    pub fn registry(&self) -> &TournamentRegistry {
        &self.registry
    }

    /// Pairs the current round from the active pool and opens the
    /// corresponding ledger rows. The bye, if any, is resolved on the
    /// spot as a full win.
    fn pair_current_round(
        state: &mut TournamentRunState,
        policy: PairingPolicy,
    ) -> Result<Vec<PairingDto>> {
        let round = state.current_round;
        let draw = {
            let active = state.active_competitors();
            pair_round(&active, policy)
        };

        let mut pairings = Vec::with_capacity(draw.pairs.len() + 1);
        for (first, second) in draw.pairs {
            let id = state.next_pairing_id();
            let pairing = RoundPairing::new_pair(id, round, first, second);
            pairings.push(PairingDto::from(&pairing));
            state.pairings.push(pairing);
            state.competitor_mut(first)?.schedule_round(round, second);
            state.competitor_mut(second)?.schedule_round(round, first);
        }
        if let Some(bye) = draw.bye {
            let id = state.next_pairing_id();
            let pairing = RoundPairing::new_bye(id, round, bye);
            pairings.push(PairingDto::from(&pairing));
            state.pairings.push(pairing);
            state.competitor_mut(bye)?.award_bye(round);
        }

        log::info!(
            "tournament {}: round {round} paired ({} boards{})",
            state.tournament_id,
            pairings.iter().filter(|p| p.second.is_some()).count(),
            if pairings.iter().any(|p| p.second.is_none()) {
                ", 1 bye"
            } else {
                ""
            }
        );
        Ok(pairings)
    }

    /// Phase one of settlement: one Glicko-2 update per competitor from
    /// the full ledger, stored locally before anything leaves the core.
    /// Byes contribute no observation; the empty-sample inactivity rule
    /// covers a competitor who only ever sat out.
    fn settle_ratings(state: &mut TournamentRunState, params: Glicko2Params) -> Result<()> {
        let now = Utc::now();
        let mut snapshots = Vec::with_capacity(state.competitors.len());

        for competitor in state.competitors.values() {
            let mut samples = Vec::with_capacity(competitor.ledger.len());
            for entry in &competitor.ledger {
                let Some(opponent_id) = entry.opponent else {
                    continue;
                };
                let result = entry.result.ok_or_else(|| {
                    SharedError::InvalidState(format!(
                        "player {} has an unresolved round {}",
                        competitor.player_id, entry.round
                    ))
                })?;
                let opponent = state.competitor(opponent_id)?;
                samples.push(OpponentSample {
                    rating: opponent.seed_rating,
                    rating_deviation: opponent.seed_rating_deviation,
                    score: result.score(),
                });
            }

            let updated = compute_rating(
                RatingState {
                    rating: competitor.seed_rating,
                    rating_deviation: competitor.seed_rating_deviation,
                    volatility: competitor.seed_volatility,
                },
                &samples,
                params,
            )?;

            snapshots.push(RatingSnapshot {
                player_id: competitor.player_id,
                tournament_id: state.tournament_id,
                rating: updated.rating,
                rating_deviation: updated.rating_deviation,
                volatility: updated.volatility,
                points: competitor.points,
                computed_at: now,
                pushed: false,
            });
        }

        state.snapshots = snapshots;
        Ok(())
    }

    /// Phase two of settlement: hand each still-unpushed snapshot to the
    /// rating sink. A failure stops the walk and surfaces to the caller;
    /// everything already accepted stays marked pushed.
    async fn push_pending(state: &mut TournamentRunState, sink: &S) -> Result<usize> {
        let mut pushed = 0;
        for snapshot in state.snapshots.iter_mut().filter(|s| !s.pushed) {
            sink.push_rating(RatingSnapshotDto::from(&*snapshot))
                .await
                .map_err(|err| {
                    log::warn!(
                        "tournament {}: rating push for player {} failed: {err}",
                        snapshot.tournament_id,
                        snapshot.player_id
                    );
                    err
                })?;
            snapshot.pushed = true;
            pushed += 1;
        }
        Ok(pushed)
    }
}

#[async_trait]
impl<P, S> TournamentUseCase for TournamentUseCaseImpl<P, S>
where
    P: PlayerRatingProvider,
    S: RatingSink,
{
    async fn start_tournament(
        &self,
        tournament_id: TournamentId,
        max_rounds: u32,
        seeds: Vec<PlayerId>,
        rules: TournamentRules,
    ) -> Result<Vec<PairingDto>> {
        rules.validate_fields()?;
        if max_rounds == 0 {
            return Err(SharedError::Validation(
                "a tournament needs at least one round".to_string(),
            ));
        }
        if seeds.is_empty() {
            return Err(SharedError::Validation(
                "a tournament needs at least one competitor".to_string(),
            ));
        }
        let mut unique = HashSet::new();
        for player_id in &seeds {
            if !unique.insert(*player_id) {
                return Err(SharedError::Validation(format!(
                    "player {player_id} is seeded twice"
                )));
            }
        }

        // Seed from the live rating store and gate admission before any
        // run state exists, so a rejected roster leaves no trace.
        let mut admitted = Vec::with_capacity(seeds.len());
        for player_id in &seeds {
            let details = self.provider.fetch_details(*player_id).await?;
            if details.player_id != *player_id {
                return Err(SharedError::Upstream(format!(
                    "provider answered for player {} when asked about {player_id}",
                    details.player_id
                )));
            }
            details.validate().map_err(SharedError::from)?;
            check_eligibility(&details, &rules)?;
            admitted.push(details);
        }

        let run = self.registry.create(tournament_id, max_rounds).await?;
        let mut state = run.lock().await;
        for details in admitted {
            state.competitors.insert(
                details.player_id,
                Competitor::new(
                    details.player_id,
                    details.rating,
                    details.rating_deviation,
                    details.volatility,
                ),
            );
        }
        state.status = TournamentStatus::InProgress;
        state.current_round = 1;
        state.started_at = Some(Utc::now());

        log::info!(
            "tournament {tournament_id} started: {} competitors, {max_rounds} rounds",
            state.competitors.len()
        );
        Self::pair_current_round(&mut state, self.policy)
    }

    async fn record_match_outcome(
        &self,
        tournament_id: TournamentId,
        pairing_id: PairingId,
        outcome: MatchOutcome,
    ) -> Result<()> {
        let run = self.registry.get(tournament_id).await?;
        let mut state = run.lock().await;

        if state.status != TournamentStatus::InProgress {
            return Err(SharedError::InvalidState(format!(
                "tournament {tournament_id} is not in progress"
            )));
        }
        let pairing = state.pairing(pairing_id).ok_or_else(|| {
            SharedError::NotFound(format!(
                "pairing {pairing_id} does not exist in tournament {tournament_id}"
            ))
        })?;
        if pairing.round != state.current_round {
            return Err(SharedError::InvalidState(format!(
                "pairing {pairing_id} belongs to round {}, current round is {}",
                pairing.round, state.current_round
            )));
        }
        if pairing.is_resolved() {
            return Err(SharedError::InvalidState(format!(
                "pairing {pairing_id} is already resolved"
            )));
        }

        recorder::apply_outcome(&mut state, pairing_id, outcome)
    }

    async fn advance_round(&self, tournament_id: TournamentId) -> Result<RoundAdvance> {
        let run = self.registry.get(tournament_id).await?;
        let mut state = run.lock().await;

        match state.status {
            TournamentStatus::InProgress => {}
            TournamentStatus::NotStarted => {
                return Err(SharedError::InvalidState(format!(
                    "tournament {tournament_id} has not started"
                )))
            }
            TournamentStatus::Finalized => {
                return Err(SharedError::InvalidState(format!(
                    "tournament {tournament_id} is already finalized"
                )))
            }
        }
        let round = state.current_round;
        if !state.round_resolved(round) {
            return Err(SharedError::InvalidState(format!(
                "tournament {tournament_id}: round {round} still has unresolved pairings"
            )));
        }

        if round < state.max_rounds {
            state.current_round = round + 1;
            let pairings = Self::pair_current_round(&mut state, self.policy)?;
            return Ok(RoundAdvance::NextRound {
                round: round + 1,
                pairings,
            });
        }

        Self::settle_ratings(&mut state, self.params)?;
        state.status = TournamentStatus::Finalized;
        state.finalized_at = Some(Utc::now());
        log::info!(
            "tournament {tournament_id} finalized after {round} rounds; {} ratings settled",
            state.snapshots.len()
        );

        let snapshots = state.snapshots.iter().map(RatingSnapshotDto::from).collect();
        Self::push_pending(&mut state, self.sink.as_ref()).await?;
        Ok(RoundAdvance::Finalized { snapshots })
    }

    async fn withdraw_player(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> Result<()> {
        let run = self.registry.get(tournament_id).await?;
        let mut state = run.lock().await;

        if state.status == TournamentStatus::Finalized {
            return Err(SharedError::InvalidState(format!(
                "tournament {tournament_id} is already finalized"
            )));
        }
        if !state.competitor(player_id)?.is_active() {
            return Err(SharedError::InvalidState(format!(
                "player {player_id} has already withdrawn"
            )));
        }
        let current_round = state.current_round;
        let has_open_pairing = state
            .pairings
            .iter()
            .any(|p| p.round == current_round && !p.is_resolved() && p.involves(player_id));
        if has_open_pairing {
            return Err(SharedError::InvalidState(format!(
                "player {player_id} has an unresolved pairing in round {current_round}; record a forfeit first"
            )));
        }

        state.competitor_mut(player_id)?.status = CompetitorStatus::Withdrawn;
        log::info!("tournament {tournament_id}: player {player_id} withdrew");
        Ok(())
    }

    async fn get_standings(&self, tournament_id: TournamentId) -> Result<Vec<StandingDto>> {
        let run = self.registry.get(tournament_id).await?;
        let state = run.lock().await;

        let mut ranked: Vec<&Competitor> = state.competitors.values().collect();
        ranked.sort_by(|a, b| swiss::compare_standing(a, b));
        Ok(ranked
            .into_iter()
            .enumerate()
            .map(|(index, competitor)| StandingDto {
                rank: index as u32 + 1,
                player_id: competitor.player_id,
                points: competitor.points,
                rating: competitor.seed_rating,
                rounds_played: competitor.rounds_played(),
                status: competitor.status,
            })
            .collect())
    }

    async fn get_pairings(
        &self,
        tournament_id: TournamentId,
        round: u32,
    ) -> Result<Vec<PairingDto>> {
        let run = self.registry.get(tournament_id).await?;
        let state = run.lock().await;

        let pairings: Vec<PairingDto> =
            state.round_pairings(round).map(PairingDto::from).collect();
        if pairings.is_empty() {
            return Err(SharedError::NotFound(format!(
                "tournament {tournament_id} has no round {round}"
            )));
        }
        Ok(pairings)
    }

    async fn get_snapshots(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<RatingSnapshotDto>> {
        let run = self.registry.get(tournament_id).await?;
        let state = run.lock().await;

        if state.status != TournamentStatus::Finalized {
            return Err(SharedError::InvalidState(format!(
                "tournament {tournament_id} is not finalized yet"
            )));
        }
        Ok(state.snapshots.iter().map(RatingSnapshotDto::from).collect())
    }

    async fn retry_rating_push(&self, tournament_id: TournamentId) -> Result<usize> {
        let run = self.registry.get(tournament_id).await?;
        let mut state = run.lock().await;

        if state.status != TournamentStatus::Finalized {
            return Err(SharedError::InvalidState(format!(
                "tournament {tournament_id} is not finalized yet"
            )));
        }
        Self::push_pending(&mut state, self.sink.as_ref()).await
    }
}
