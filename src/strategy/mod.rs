//! Decision policies for CPU-driven cars.
//!
//! Every policy sees the same inputs: its own car, the track and the other cars. None of them
//! keeps race state between turns; they only probe the movement resolver.

mod distance;
mod heuristic;
mod random;
mod script;
mod weighted;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::car::Car;
use crate::movement::{self, MoveOutcome, Occupant};
use crate::track::Track;
use crate::vector::{Acceleration, Position, Velocity};

pub use distance::DistanceField;
pub use heuristic::HeuristicStrategy;
pub use random::RandomStrategy;
pub use script::ScriptedStrategy;
pub use weighted::WeightedStrategy;

pub trait CpuStrategy {
    fn name(&self) -> &str;

    /// Always returns one of [`Acceleration::ALL`].
    fn choose_acceleration(&mut self, car: &Car, track: &Track, others: &[Car]) -> Acceleration;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Heuristic,
    Weighted,
    Random,
}

impl StrategyKind {
    pub fn build(self, seed: Option<u64>) -> Box<dyn CpuStrategy> {
        match self {
            StrategyKind::Heuristic => Box::new(HeuristicStrategy),
            StrategyKind::Weighted => Box::new(WeightedStrategy),
            StrategyKind::Random => Box::new(match seed {
                Some(seed) => RandomStrategy::seeded(seed),
                None => RandomStrategy::from_entropy(),
            }),
        }
    }
}

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("failed to read script {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("script {name} is not usable")]
    Script {
        name: String,
        #[source]
        source: mlua::Error,
    },
}

/// What would happen with one candidate acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub acceleration: Acceleration,
    pub outcome: MoveOutcome,
}

impl Probe {
    pub const fn is_safe(&self) -> bool {
        !self.outcome.is_collision()
    }
}

/// Resolves all nine candidates for `car`, in [`Acceleration::ALL`] order.
pub fn probe(car: &Car, track: &Track, others: &[Car]) -> Vec<Probe> {
    let occupants = Occupant::racing_except(others, car.id);
    Acceleration::ALL
        .iter()
        .map(|&acceleration| Probe {
            acceleration,
            outcome: movement::resolve(track, car.position, car.velocity, acceleration, &occupants),
        })
        .collect()
}

/// Best pick when nothing better is known: a safe move, then hitting a car, then a wall.
/// Ties go to the earliest probe; no probes at all means zero acceleration.
pub fn least_bad(probes: &[Probe]) -> Acceleration {
    probes
        .iter()
        .min_by_key(|p| match p.outcome {
            MoveOutcome::Legal { .. } | MoveOutcome::FinishCrossed { .. } => 0,
            MoveOutcome::CarCollision { .. } => 1,
            MoveOutcome::WallCollision { .. } => 2,
        })
        .map_or(Acceleration::ZERO, |p| p.acceleration)
}

/// Whether braking as hard as possible brings the car to a stop (or over the finish line)
/// without a collision, assuming the `occupants` stay where they are.
pub fn can_stop(
    track: &Track,
    mut position: Position,
    mut velocity: Velocity,
    occupants: &[Occupant],
) -> bool {
    while !velocity.is_zero() {
        let brake = Acceleration::ALL
            .into_iter()
            .find(|a| a.ax() == -velocity.dx.signum() && a.ay() == -velocity.dy.signum())
            .unwrap_or(Acceleration::ZERO);
        match movement::resolve(track, position, velocity, brake, occupants) {
            MoveOutcome::Legal {
                position: p,
                velocity: v,
            } => {
                position = p;
                velocity = v;
            }
            MoveOutcome::FinishCrossed { .. } => return true,
            MoveOutcome::WallCollision { .. } | MoveOutcome::CarCollision { .. } => return false,
        }
    }
    true
}
