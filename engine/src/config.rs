use crate::pairing::swiss::PairingPolicy;
use crate::ratings::glicko::Glicko2Params;
use dotenv::dotenv;
use log::info;
use serde::Deserialize;
use shared::{Result, SharedError};
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ratings: RatingsConfig,
    pub pairing: PairingConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingsConfig {
    /// Glicko-2 system constant τ.
    pub tau: f64,
    /// Convergence tolerance ε of the volatility iteration.
    pub convergence_tolerance: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairingConfig {
    pub avoid_rematches: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between round-advance sweeps.
    pub sweep_interval_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ratings: RatingsConfig {
                tau: 0.5,
                convergence_tolerance: 1e-6,
            },
            pairing: PairingConfig {
                avoid_rematches: false,
            },
            scheduler: SchedulerConfig {
                sweep_interval_seconds: 60,
            },
        }
    }
}

impl Config {
    /// Loads configuration from the environment (with `.env` support),
    /// falling back to defaults for anything unset.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let defaults = Config::default();
        let config = Config {
            ratings: RatingsConfig {
                tau: parse_var("GLICKO_TAU", defaults.ratings.tau)?,
                convergence_tolerance: parse_var(
                    "GLICKO_CONVERGENCE_TOLERANCE",
                    defaults.ratings.convergence_tolerance,
                )?,
            },
            pairing: PairingConfig {
                avoid_rematches: parse_var(
                    "PAIRING_AVOID_REMATCHES",
                    defaults.pairing.avoid_rematches,
                )?,
            },
            scheduler: SchedulerConfig {
                sweep_interval_seconds: parse_var(
                    "SCHEDULER_SWEEP_INTERVAL_SECONDS",
                    defaults.scheduler.sweep_interval_seconds,
                )?,
            },
        };

        config.validate()?;
        config.log_configuration();
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.ratings.tau <= 0.0 {
            return Err(SharedError::Validation(format!(
                "GLICKO_TAU must be positive, got {}",
                self.ratings.tau
            )));
        }
        if self.ratings.convergence_tolerance <= 0.0 {
            return Err(SharedError::Validation(format!(
                "GLICKO_CONVERGENCE_TOLERANCE must be positive, got {}",
                self.ratings.convergence_tolerance
            )));
        }
        if self.scheduler.sweep_interval_seconds == 0 {
            return Err(SharedError::Validation(
                "SCHEDULER_SWEEP_INTERVAL_SECONDS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn log_configuration(&self) {
        info!(
            "Engine configured: tau={}, tolerance={}, avoid_rematches={}, sweep every {}s",
            self.ratings.tau,
            self.ratings.convergence_tolerance,
            self.pairing.avoid_rematches,
            self.scheduler.sweep_interval_seconds
        );
    }
}

impl RatingsConfig {
    pub fn params(&self) -> Glicko2Params {
        Glicko2Params {
            tau: self.tau,
            convergence_tolerance: self.convergence_tolerance,
        }
    }
}

impl PairingConfig {
    pub fn policy(&self) -> PairingPolicy {
        PairingPolicy {
            avoid_rematches: self.avoid_rematches,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| {
            SharedError::Validation(format!("{name} has an unparseable value: {raw}"))
        }),
        Err(_) => Ok(default),
    }
}
