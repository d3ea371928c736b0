use super::{least_bad, probe, CpuStrategy, Probe};
use crate::car::Car;
use crate::movement::MoveOutcome;
use crate::track::{CellType, Track};
use crate::vector::{Acceleration, Position, Velocity};

const CELL_TYPE_WEIGHT: f64 = 0.6;
const BORDER_WEIGHT: f64 = 0.3;
const VELOCITY_WEIGHT: f64 = 0.1;

const ROAD_SCORE: f64 = 10.0;
const START_SCORE: f64 = 1.0;
const FINISH_SCORE: f64 = 20.0;

const IDEAL_SPEED: f64 = 2.0;
const SPEED_SIGMA: f64 = 1.0;
const STAY_IN_PLACE_PENALTY: f64 = 0.5;

/// Scores each safe landing cell by its type, its room to the closest wall and how close the
/// resulting speed is to a comfortable cruising speed. Looks one turn ahead only.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedStrategy;

impl CpuStrategy for WeightedStrategy {
    fn name(&self) -> &str {
        "weighted"
    }

    fn choose_acceleration(&mut self, car: &Car, track: &Track, others: &[Car]) -> Acceleration {
        let probes = probe(car, track, others);
        let mut best: Option<(f64, Acceleration)> = None;
        for p in probes.iter().filter(|p| p.is_safe()) {
            let weight = weight(track, p);
            if best.map_or(true, |(w, _)| weight > w) {
                best = Some((weight, p.acceleration));
            }
        }

        best.map_or_else(|| least_bad(&probes), |(_, acceleration)| acceleration)
    }
}

fn weight(track: &Track, probe: &Probe) -> f64 {
    let (landing, velocity) = match probe.outcome {
        MoveOutcome::Legal { position, velocity } => (position, velocity),
        MoveOutcome::FinishCrossed { at, velocity } => (at, velocity),
        MoveOutcome::WallCollision { .. } | MoveOutcome::CarCollision { .. } => return 0.0,
    };

    let cell_score = match track.cell_at(landing) {
        Ok(CellType::Finish) => FINISH_SCORE,
        Ok(CellType::Road) if track.is_start(landing) => START_SCORE,
        Ok(CellType::Road) => ROAD_SCORE,
        Ok(CellType::Wall) | Err(_) => START_SCORE,
    };
    let border_score = f64::from(room(track, landing)).sqrt();

    cell_score * CELL_TYPE_WEIGHT
        + border_score * BORDER_WEIGHT
        + speed_score(velocity) * VELOCITY_WEIGHT
}

fn speed_score(velocity: Velocity) -> f64 {
    let score = (-(velocity.speed() - IDEAL_SPEED).powi(2) / (2.0 * SPEED_SIGMA.powi(2))).exp();
    if velocity.is_zero() {
        score * STAY_IN_PLACE_PENALTY
    } else {
        score
    }
}

/// Steps to the closest wall (or the edge of the track) straight up, down, left or right.
fn room(track: &Track, from: Position) -> u32 {
    [(0, -1), (1, 0), (0, 1), (-1, 0)]
        .into_iter()
        .map(|(dx, dy)| {
            let mut steps = 1;
            while track
                .cell_at(Position::new(from.x + dx * steps, from.y + dy * steps))
                .is_ok_and(|cell| cell.is_drivable())
            {
                steps += 1;
            }
            steps as u32
        })
        .min()
        .unwrap_or(0)
}
