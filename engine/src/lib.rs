pub mod clients;
pub mod config;

pub mod ratings {
    pub mod glicko;

    pub use glicko::{compute_rating, Glicko2Params, OpponentSample, RatingState};

    #[cfg(test)]
    mod glicko_test;
}

pub mod pairing {
    pub mod swiss;

    pub use swiss::{pair_round, PairingPolicy, RoundDraw};
}

pub mod tournament {
    pub mod eligibility;
    pub mod recorder;
    pub mod registry;
    pub mod scheduler;
    pub mod usecase;

    pub use registry::TournamentRegistry;
    pub use scheduler::{RoundScheduler, SchedulerStatus};
    pub use usecase::{RoundAdvance, TournamentUseCase, TournamentUseCaseImpl};

    #[cfg(test)]
    mod usecase_tests;
}
