//! Who decides where a car goes next.
//!
//! The engine only talks to [`MoveProvider`]. CPU strategies are plugged in through
//! [`CpuDriver`], people through [`HumanInput`].

mod human;

use thiserror::Error;

use crate::car::{Car, CarId, Driver};
use crate::strategy::CpuStrategy;
use crate::track::Track;
use crate::vector::Acceleration;

pub use human::{HumanInput, LineSource};

/// Read-only snapshot of the race handed to a provider for one turn.
#[derive(Debug, Clone, Copy)]
pub struct RaceView<'a> {
    pub track: &'a Track,
    /// Every car in the race, the one being moved included.
    pub cars: &'a [Car],
    pub round: usize,
}

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("failed to talk to the player")]
    Io(#[from] std::io::Error),
    #[error("input closed before car {0} got a move")]
    InputClosed(CarId),
}

pub trait MoveProvider {
    fn driver(&self) -> Driver;

    /// The acceleration `car` applies this turn. Only legal accelerations are representable, so
    /// an `Ok` is always playable.
    fn acceleration_for(
        &mut self,
        car: &Car,
        view: &RaceView<'_>,
    ) -> Result<Acceleration, ControllerError>;
}

/// Drives a car with a [`CpuStrategy`].
pub struct CpuDriver {
    strategy: Box<dyn CpuStrategy>,
}

impl CpuDriver {
    pub fn new(strategy: Box<dyn CpuStrategy>) -> Self {
        Self { strategy }
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }
}

impl MoveProvider for CpuDriver {
    fn driver(&self) -> Driver {
        Driver::Cpu
    }

    fn acceleration_for(
        &mut self,
        car: &Car,
        view: &RaceView<'_>,
    ) -> Result<Acceleration, ControllerError> {
        let others: Vec<Car> = view
            .cars
            .iter()
            .filter(|other| other.id != car.id)
            .cloned()
            .collect();
        Ok(self.strategy.choose_acceleration(car, view.track, &others))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::strategy::StrategyKind;
    use crate::tests::{accel, corridor};
    use crate::vector::Position;

    #[test]
    fn test_cpu_driver_delegates_to_its_strategy() {
        let track = corridor(&["      -"]);
        let car = Car::new(CarId(0), "cpu".into(), Driver::Cpu, Position::new(0, 0));
        let cars = vec![car.clone()];
        let view = RaceView {
            track: &track,
            cars: &cars,
            round: 1,
        };

        let mut driver = CpuDriver::new(StrategyKind::Heuristic.build(None));
        assert_eq!(driver.driver(), Driver::Cpu);
        assert_eq!(driver.strategy_name(), "heuristic");
        assert_eq!(driver.acceleration_for(&car, &view).unwrap(), accel(1, 0));
    }

    #[test]
    fn test_cpu_driver_does_not_see_itself_as_an_obstacle() {
        let track = corridor(&["***", "* *", "***"]);
        let car = Car::new(CarId(0), "cpu".into(), Driver::Cpu, Position::new(1, 1));
        let cars = vec![car.clone()];
        let view = RaceView {
            track: &track,
            cars: &cars,
            round: 1,
        };

        let mut driver = CpuDriver::new(StrategyKind::Weighted.build(None));
        assert_eq!(
            driver.acceleration_for(&car, &view).unwrap(),
            Acceleration::ZERO
        );
    }
}
