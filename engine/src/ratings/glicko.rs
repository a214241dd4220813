// Glicko-2 rating computation (per Mark Glickman)
// Display scale is the usual 1500-centered rating; all work happens on
// the internal μ/φ scale with the 173.7178 conversion factor.

use shared::{Result, SharedError};

pub const GLICKO2_SCALE: f64 = 173.7178;

#[derive(Debug, Clone, Copy)]
pub struct Glicko2Params {
    /// System constant constraining volatility change, 0.3–1.2 in
    /// practice; we use 0.5.
    pub tau: f64,
    /// Convergence tolerance for the volatility iteration.
    pub convergence_tolerance: f64,
}

impl Default for Glicko2Params {
    fn default() -> Self {
        Self {
            tau: 0.5,
            convergence_tolerance: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingState {
    pub rating: f64,
    pub rating_deviation: f64,
    pub volatility: f64,
}

/// One observed game: the opponent's rating triple fragment and the
/// score from the rated player's perspective (1.0 win, 0.5 draw, 0.0
/// loss).
#[derive(Debug, Clone, Copy)]
pub struct OpponentSample {
    pub rating: f64,
    pub rating_deviation: f64,
    pub score: f64,
}

// Helpers per Glicko-2 formulas
fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi.powi(2) / std::f64::consts::PI.powi(2)).sqrt()
}

fn expected_score(mu: f64, mu_j: f64, phi_j: f64) -> f64 {
    1.0 / (1.0 + (-g(phi_j) * (mu - mu_j)).exp())
}

fn to_mu(rating: f64) -> f64 {
    (rating - 1500.0) / GLICKO2_SCALE
}

fn to_phi(rd: f64) -> f64 {
    rd / GLICKO2_SCALE
}

fn from_mu(mu: f64) -> f64 {
    mu * GLICKO2_SCALE + 1500.0
}

fn from_phi(phi: f64) -> f64 {
    phi * GLICKO2_SCALE
}

/// Updates a player's rating triple from one rating period's worth of
/// observations. Deterministic and side-effect free.
///
/// An empty sample list is the inactivity case (a player who only
/// received byes): the deviation grows by the standard
/// `φ' = sqrt(φ² + σ²)` step while rating and volatility stay put.
pub fn compute_rating(
    current: RatingState,
    opponents: &[OpponentSample],
    params: Glicko2Params,
) -> Result<RatingState> {
    validate_inputs(&current, opponents, &params)?;

    let mu = to_mu(current.rating);
    let phi = to_phi(current.rating_deviation);
    let sigma = current.volatility;

    if opponents.is_empty() {
        let phi_star = (phi.powi(2) + sigma.powi(2)).sqrt();
        return Ok(RatingState {
            rating: current.rating,
            rating_deviation: from_phi(phi_star),
            volatility: sigma,
        });
    }

    // Estimated variance v and improvement sum Σ g(φj)·(sj − E)
    let mut v_inv = 0.0;
    let mut improvement_sum = 0.0;
    for sample in opponents {
        let mu_j = to_mu(sample.rating);
        let phi_j = to_phi(sample.rating_deviation);
        let g_phi = g(phi_j);
        let e_val = expected_score(mu, mu_j, phi_j);
        v_inv += g_phi * g_phi * e_val * (1.0 - e_val);
        improvement_sum += g_phi * (sample.score - e_val);
    }
    let v = 1.0 / v_inv;
    let delta = v * improvement_sum;

    let sigma_prime = solve_volatility(phi, sigma, v, delta, &params);

    // Pre-update deviation, then the post-period deviation and rating.
    let phi_star = (phi.powi(2) + sigma_prime.powi(2)).sqrt();
    let phi_prime = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();
    let mu_prime = mu + phi_prime * phi_prime * improvement_sum;

    Ok(RatingState {
        rating: from_mu(mu_prime),
        rating_deviation: from_phi(phi_prime),
        volatility: sigma_prime,
    })
}

/// Solves for the new volatility σ' by root-finding on the Glicko-2
/// convergence function: bracket with the sign of f(A − k·τ), then
/// refine with the Illinois variant of the secant method.
fn solve_volatility(phi: f64, sigma: f64, v: f64, delta: f64, params: &Glicko2Params) -> f64 {
    let delta_sq = delta * delta;
    let phi_sq = phi * phi;
    let tau = params.tau;
    let a = (sigma * sigma).ln();

    let f = |x: f64| {
        let ex = x.exp();
        let numerator = ex * (delta_sq - phi_sq - v - ex);
        let denominator = 2.0 * (phi_sq + v + ex) * (phi_sq + v + ex);
        numerator / denominator - (x - a) / (tau * tau)
    };

    let mut lower = a;
    let mut upper = if delta_sq > phi_sq + v {
        (delta_sq - phi_sq - v).ln()
    } else {
        let mut k = 1.0;
        while f(a - k * tau) < 0.0 {
            k += 1.0;
        }
        a - k * tau
    };

    let mut f_lower = f(lower);
    let mut f_upper = f(upper);
    while (upper - lower).abs() > params.convergence_tolerance {
        let candidate = lower + (lower - upper) * f_lower / (f_upper - f_lower);
        let f_candidate = f(candidate);
        if f_candidate * f_upper <= 0.0 {
            lower = upper;
            f_lower = f_upper;
        } else {
            f_lower /= 2.0;
        }
        upper = candidate;
        f_upper = f_candidate;
    }

    (lower / 2.0).exp()
}

fn validate_inputs(
    current: &RatingState,
    opponents: &[OpponentSample],
    params: &Glicko2Params,
) -> Result<()> {
    if !current.rating.is_finite() || !current.rating_deviation.is_finite() {
        return Err(SharedError::Validation(
            "rating and deviation must be finite".to_string(),
        ));
    }
    if current.rating_deviation <= 0.0 {
        return Err(SharedError::Validation(format!(
            "rating deviation must be positive, got {}",
            current.rating_deviation
        )));
    }
    if !current.volatility.is_finite() || current.volatility <= 0.0 {
        return Err(SharedError::Validation(format!(
            "volatility must be positive, got {}",
            current.volatility
        )));
    }
    if params.tau <= 0.0 || params.convergence_tolerance <= 0.0 {
        return Err(SharedError::Validation(
            "tau and convergence tolerance must be positive".to_string(),
        ));
    }
    for (index, sample) in opponents.iter().enumerate() {
        if !sample.rating.is_finite() || !sample.rating_deviation.is_finite() {
            return Err(SharedError::Validation(format!(
                "opponent {index}: rating and deviation must be finite"
            )));
        }
        if sample.rating_deviation <= 0.0 {
            return Err(SharedError::Validation(format!(
                "opponent {index}: rating deviation must be positive, got {}",
                sample.rating_deviation
            )));
        }
        if !(0.0..=1.0).contains(&sample.score) {
            return Err(SharedError::Validation(format!(
                "opponent {index}: score must be within [0, 1], got {}",
                sample.score
            )));
        }
    }
    Ok(())
}
