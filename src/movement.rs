//! Movement resolution for a single turn.
//!
//! The straight line from the current position to the new one is rasterized cell by cell, so a
//! car moving several cells per turn still hits every wall, car or finish cell in between.

use serde::{Deserialize, Serialize};

use crate::car::{Car, CarId};
use crate::track::{CellType, Track};
use crate::vector::{Acceleration, Position, Velocity};

/// Another car that blocks the cell it stands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    pub id: CarId,
    pub position: Position,
}

impl Occupant {
    /// Racing cars other than `me`. Finished and crashed cars do not block the road.
    pub fn racing_except(cars: &[Car], me: CarId) -> Vec<Occupant> {
        cars.iter()
            .filter(|c| c.id != me && c.is_racing())
            .map(|c| Occupant {
                id: c.id,
                position: c.position,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveOutcome {
    Legal {
        position: Position,
        velocity: Velocity,
    },
    /// `at` is the first wall cell on the path, or the first cell past the edge of the track.
    WallCollision { at: Position },
    CarCollision { other: CarId, at: Position },
    FinishCrossed {
        at: Position,
        velocity: Velocity,
    },
}

impl MoveOutcome {
    pub const fn is_collision(&self) -> bool {
        matches!(
            self,
            MoveOutcome::WallCollision { .. } | MoveOutcome::CarCollision { .. }
        )
    }

    pub const fn tag(&self) -> &'static str {
        match self {
            MoveOutcome::Legal { .. } => "legal",
            MoveOutcome::WallCollision { .. } => "wall",
            MoveOutcome::CarCollision { .. } => "car",
            MoveOutcome::FinishCrossed { .. } => "finish",
        }
    }
}

/// Resolves one turn for a car at `position` moving with `velocity`.
pub fn resolve(
    track: &Track,
    position: Position,
    velocity: Velocity,
    acceleration: Acceleration,
    others: &[Occupant],
) -> MoveOutcome {
    let velocity = velocity + acceleration;
    let destination = position + velocity;

    for cell in Trajectory::new(position, destination) {
        match track.cell_at(cell) {
            Err(_) | Ok(CellType::Wall) => return MoveOutcome::WallCollision { at: cell },
            Ok(cell_type) => {
                if let Some(other) = others.iter().find(|o| o.position == cell) {
                    return MoveOutcome::CarCollision {
                        other: other.id,
                        at: cell,
                    };
                }
                if cell_type == CellType::Finish {
                    return MoveOutcome::FinishCrossed { at: cell, velocity };
                }
            }
        }
    }

    MoveOutcome::Legal {
        position: destination,
        velocity,
    }
}

/// Bresenham walk over the cells from `from` (excluded) to `to` (included).
#[derive(Debug, Clone)]
pub struct Trajectory {
    current: Position,
    to: Position,
    dx: i64,
    dy: i64,
    step_x: i32,
    step_y: i32,
    error: i64,
    done: bool,
}

impl Trajectory {
    pub fn new(from: Position, to: Position) -> Self {
        let dx = (i64::from(to.x) - i64::from(from.x)).abs();
        let dy = -(i64::from(to.y) - i64::from(from.y)).abs();
        Self {
            current: from,
            to,
            dx,
            dy,
            step_x: if from.x < to.x { 1 } else { -1 },
            step_y: if from.y < to.y { 1 } else { -1 },
            error: dx + dy,
            done: from == to,
        }
    }
}

impl Iterator for Trajectory {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let doubled = 2 * self.error;
        if doubled >= self.dy {
            self.error += self.dy;
            self.current.x += self.step_x;
        }
        if doubled <= self.dx {
            self.error += self.dx;
            self.current.y += self.step_y;
        }

        self.done = self.current == self.to;
        Some(self.current)
    }
}
