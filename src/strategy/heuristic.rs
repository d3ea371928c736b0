use tracing::trace;

use super::{can_stop, least_bad, probe, CpuStrategy, DistanceField};
use crate::car::Car;
use crate::movement::{MoveOutcome, Occupant};
use crate::track::Track;
use crate::vector::Acceleration;

/// Heads for the finish along the shortest road, never picks a move it cannot brake out of
/// when another one is available, and takes the finish line whenever it can.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicStrategy;

impl CpuStrategy for HeuristicStrategy {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn choose_acceleration(&mut self, car: &Car, track: &Track, others: &[Car]) -> Acceleration {
        let probes = probe(car, track, others);
        if let Some(finish) = probes
            .iter()
            .find(|p| matches!(p.outcome, MoveOutcome::FinishCrossed { .. }))
        {
            return finish.acceleration;
        }

        let field = DistanceField::to_finish(track);
        let occupants = Occupant::racing_except(others, car.id);
        let best = probes
            .iter()
            .filter_map(|p| match p.outcome {
                MoveOutcome::Legal { position, velocity } => {
                    let stuck = !can_stop(track, position, velocity, &occupants);
                    let distance = field.get(position).unwrap_or(u32::MAX);
                    Some(((stuck, distance), p.acceleration))
                }
                _ => None,
            })
            .min_by_key(|(key, _)| *key);

        match best {
            Some((key, acceleration)) => {
                trace!(car = %car.id, ?key, %acceleration, "heuristic pick");
                acceleration
            }
            None => least_bad(&probes),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::car::{CarId, Driver, Status};
    use crate::tests::{accel, corridor, hairpin};
    use crate::vector::{Position, Velocity};

    fn cpu(x: i32, y: i32) -> Car {
        Car::new(CarId(0), "cpu".into(), Driver::Cpu, Position::new(x, y))
    }

    #[test]
    fn test_only_legal_candidate_is_chosen() {
        let track = corridor(&["***", "* *", "***", "  -"]);
        let choice = HeuristicStrategy.choose_acceleration(&cpu(1, 1), &track, &[]);
        assert_eq!(choice, Acceleration::ZERO);
    }

    #[test]
    fn test_finish_is_taken() {
        let track = corridor(&["   -"]);
        let mut car = cpu(0, 0);
        car.velocity = Velocity::new(2, 0);
        let choice = HeuristicStrategy.choose_acceleration(&car, &track, &[]);
        assert!(matches!(
            crate::movement::resolve(&track, car.position, car.velocity, choice, &[]),
            MoveOutcome::FinishCrossed { .. }
        ));
    }

    #[test]
    fn test_moves_towards_the_finish() {
        let track = corridor(&["      -"]);
        let choice = HeuristicStrategy.choose_acceleration(&cpu(0, 0), &track, &[]);
        assert_eq!(choice, accel(1, 0));
    }

    #[test]
    fn test_brakes_before_a_wall() {
        // Finish is below the wall row, reachable only through the gap at the left.
        let track = corridor(&["        ", " *******", "-       "]);
        let mut car = cpu(4, 0);
        car.velocity = Velocity::new(-3, 0);
        // Only slowing down to 2 still leaves room to stop before the left edge.
        let choice = HeuristicStrategy.choose_acceleration(&car, &track, &[]);
        assert_eq!(choice, accel(1, 0));
    }

    #[test]
    fn test_avoids_other_cars() {
        let track = corridor(&["    -", "     "]);
        let mut blocker = cpu(1, 0);
        blocker.id = CarId(1);
        let choice = HeuristicStrategy.choose_acceleration(&cpu(0, 0), &track, &[blocker]);
        assert_ne!(choice, accel(1, 0));
    }

    #[test]
    fn test_crashed_cars_do_not_block() {
        let track = corridor(&["    -"]);
        let mut wreck = cpu(1, 0);
        wreck.id = CarId(1);
        wreck.status = Status::Crashed;
        let choice = HeuristicStrategy.choose_acceleration(&cpu(0, 0), &track, &[wreck]);
        assert_eq!(choice, accel(1, 0));
    }

    #[test]
    fn test_drives_the_hairpin_alone() {
        let track = hairpin();
        let mut car = cpu(1, 1);
        let mut strategy = HeuristicStrategy;

        let mut finished = false;
        for _ in 0..100 {
            let acceleration = strategy.choose_acceleration(&car, &track, &[]);
            match crate::movement::resolve(&track, car.position, car.velocity, acceleration, &[]) {
                MoveOutcome::Legal { position, velocity } => {
                    car.position = position;
                    car.velocity = velocity;
                }
                MoveOutcome::FinishCrossed { .. } => {
                    finished = true;
                    break;
                }
                outcome => panic!("crashed: {outcome:?}"),
            }
        }
        assert!(finished);
    }
}
