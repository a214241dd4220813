// Swiss-system pairing: sort by standings, pair neighbors, lowest
// unpaired competitor sits out on an odd field.

use shared::models::competitor::{Competitor, PlayerId};
use std::cmp::Ordering;

/// Pairing policy knobs. With `avoid_rematches` off (the default), two
/// competitors can meet again in a later round; on, previously faced
/// opponents are passed over while an alternative exists.
#[derive(Debug, Clone, Copy)]
pub struct PairingPolicy {
    pub avoid_rematches: bool,
}

impl Default for PairingPolicy {
    fn default() -> Self {
        Self {
            avoid_rematches: false,
        }
    }
}

/// The draw for one round: who plays whom, and who (if anyone) receives
/// the bye. Pairs are ordered strongest seat first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundDraw {
    pub pairs: Vec<(PlayerId, PlayerId)>,
    pub bye: Option<PlayerId>,
}

impl RoundDraw {
    pub fn seat_count(&self) -> usize {
        self.pairs.len() * 2 + usize::from(self.bye.is_some())
    }
}

/// Pairs the given competitors for one round. Ranking is by points,
/// then seed rating, with player id as the final tie-break so the order
/// is total and the draw deterministic. On an odd field the
/// lowest-ranked competitor takes the bye.
pub fn pair_round(competitors: &[&Competitor], policy: PairingPolicy) -> RoundDraw {
    let mut ranked: Vec<&Competitor> = competitors.to_vec();
    ranked.sort_by(|a, b| compare_standing(a, b));

    let bye = if ranked.len() % 2 == 1 {
        ranked.pop().map(|competitor| competitor.player_id)
    } else {
        None
    };

    let mut pairs = Vec::with_capacity(ranked.len() / 2);
    let mut paired = vec![false; ranked.len()];
    for i in 0..ranked.len() {
        if paired[i] {
            continue;
        }
        paired[i] = true;

        let partner = select_partner(&ranked, &paired, ranked[i], policy);
        if let Some(j) = partner {
            paired[j] = true;
            pairs.push((ranked[i].player_id, ranked[j].player_id));
        }
    }

    RoundDraw { pairs, bye }
}

/// Total order behind both the draw and the standings: points desc,
/// rating desc, id asc.
pub fn compare_standing(a: &Competitor, b: &Competitor) -> Ordering {
    b.points
        .partial_cmp(&a.points)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            b.seed_rating
                .partial_cmp(&a.seed_rating)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.player_id.cmp(&b.player_id))
}

fn select_partner(
    ranked: &[&Competitor],
    paired: &[bool],
    seat: &Competitor,
    policy: PairingPolicy,
) -> Option<usize> {
    let mut fallback = None;
    for (j, candidate) in ranked.iter().enumerate() {
        if paired[j] {
            continue;
        }
        if !policy.avoid_rematches {
            return Some(j);
        }
        if !seat.has_faced(candidate.player_id) {
            return Some(j);
        }
        // Totality beats avoidance: remember the nearest rematch in
        // case every remaining candidate has been faced already.
        if fallback.is_none() {
            fallback = Some(j);
        }
    }
    fallback
}
