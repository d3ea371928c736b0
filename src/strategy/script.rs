use std::fs;
use std::path::Path;

use mlua::{Function, Lua, Table};
use tracing::{debug, warn};

use super::{can_stop, probe, CpuStrategy, DistanceField, HeuristicStrategy, StrategyError};
use crate::car::Car;
use crate::movement::{MoveOutcome, Occupant};
use crate::track::{CellType, Track};
use crate::vector::{Acceleration, Position};

const ENTRY_POINT: &str = "chooseAcceleration";

/// A strategy written in Lua.
///
/// The script defines a global `chooseAcceleration()` returning two integers. Before each call
/// the global `Race` table describes the turn:
///
/// - `Race.car`: the car to move (`id`, `label`, `x`, `y`, `vx`, `vy`, `status`)
/// - `Race.cars`: every other car, same shape
/// - `Race.track`: `width` and `height`
/// - `Race.candidates`: the nine accelerations with `x`, `y`, `outcome` (`legal`, `wall`, `car`
///   or `finish`), `distance` to the finish (`-1` when unknown) and `stoppable`
/// - `Race.cell(x, y)`: `road`, `wall`, `finish` or `outside`
///
/// Globals survive between turns. A script that fails or answers with something other than a
/// legal acceleration is overruled by [`HeuristicStrategy`] for that turn.
pub struct ScriptedStrategy {
    lua: Lua,
    name: String,
    fallback: HeuristicStrategy,
}

impl ScriptedStrategy {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StrategyError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| StrategyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(path.display().to_string(), &source)
    }

    pub fn from_source(name: impl Into<String>, source: &str) -> Result<Self, StrategyError> {
        let name = name.into();
        let lua = Lua::new();
        let loaded = lua
            .load(source)
            .set_name(name.as_str())
            .exec()
            .and_then(|()| lua.globals().get::<_, Function>(ENTRY_POINT).map(|_| ()));
        if let Err(source) = loaded {
            return Err(StrategyError::Script { name, source });
        }

        debug!(script = %name, "lua strategy loaded");
        Ok(Self {
            lua,
            name,
            fallback: HeuristicStrategy,
        })
    }

    fn ask_script(&self, car: &Car, track: &Track, others: &[Car]) -> mlua::Result<(i64, i64)> {
        let lua = &self.lua;
        let field = DistanceField::to_finish(track);
        let occupants = Occupant::racing_except(others, car.id);

        let candidates = lua.create_table()?;
        for (i, p) in probe(car, track, others).into_iter().enumerate() {
            let (landing, stoppable) = match p.outcome {
                MoveOutcome::Legal { position, velocity } => (
                    Some(position),
                    can_stop(track, position, velocity, &occupants),
                ),
                MoveOutcome::FinishCrossed { at, .. } => (Some(at), true),
                MoveOutcome::WallCollision { .. } | MoveOutcome::CarCollision { .. } => {
                    (None, false)
                }
            };
            let distance = landing
                .and_then(|position| field.get(position))
                .map_or(-1, i64::from);

            let candidate = lua.create_table()?;
            candidate.set("x", p.acceleration.ax())?;
            candidate.set("y", p.acceleration.ay())?;
            candidate.set("outcome", p.outcome.tag())?;
            candidate.set("distance", distance)?;
            candidate.set("stoppable", stoppable)?;
            candidates.set(i + 1, candidate)?;
        }

        let dimensions = lua.create_table()?;
        dimensions.set("width", track.width())?;
        dimensions.set("height", track.height())?;

        lua.scope(|scope| {
            let race: Table = lua.create_table()?;
            race.set("car", car)?;
            race.set(
                "cars",
                lua.create_sequence_from(others.iter().filter(|other| other.id != car.id))?,
            )?;
            race.set("track", dimensions)?;
            race.set("candidates", candidates)?;
            race.set(
                "cell",
                scope.create_function(|_, (x, y): (i32, i32)| {
                    Ok(match track.cell_at(Position::new(x, y)) {
                        Ok(CellType::Road) => "road",
                        Ok(CellType::Wall) => "wall",
                        Ok(CellType::Finish) => "finish",
                        Err(_) => "outside",
                    })
                })?,
            )?;
            lua.globals().set("Race", race)?;

            let choose: Function = lua.globals().get(ENTRY_POINT)?;
            let answer = choose.call::<_, (i64, i64)>(());
            lua.globals().set("Race", mlua::Value::Nil)?;
            answer
        })
    }
}

impl CpuStrategy for ScriptedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_acceleration(&mut self, car: &Car, track: &Track, others: &[Car]) -> Acceleration {
        let answer = self
            .ask_script(car, track, others)
            .map_err(|e| e.to_string())
            .and_then(|(x, y)| Acceleration::new(x, y).map_err(|e| e.to_string()));

        match answer {
            Ok(acceleration) => acceleration,
            Err(reason) => {
                warn!(script = %self.name, car = %car.id, %reason, "script overruled");
                self.fallback.choose_acceleration(car, track, others)
            }
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

    fn cpu(id: usize, x: i32, y: i32) -> Car {
        Car::new(CarId(id), format!("cpu {id}"), Driver::Cpu, Position::new(x, y))
    }

    fn script(source: &str) -> ScriptedStrategy {
        ScriptedStrategy::from_source("test", source).unwrap()
    }

    #[test]
    fn test_constant_answer() {
        let mut strategy = script("function chooseAcceleration() return 1, -1 end");
        let track = corridor(&["    ", "    ", "   -"]);
        assert_eq!(
            strategy.choose_acceleration(&cpu(0, 1, 1), &track, &[]),
            accel(1, -1)
        );
    }

    #[test]
    fn test_script_sees_the_race() {
        let mut strategy = script(
            r#"
            function chooseAcceleration()
                assert(Race.car.id == 0)
                assert(Race.car.vx == 2 and Race.car.vy == 0)
                assert(#Race.cars == 1 and Race.cars[1].status == "crashed")
                assert(Race.track.width == 6 and Race.track.height == 1)
                assert(#Race.candidates == 9)
                assert(Race.cell(5, 0) == "finish")
                assert(Race.cell(-1, 0) == "outside")
                return -1, 1
            end
            "#,
        );
        let track = corridor(&["     -"]);
        let mut car = cpu(0, 0, 0);
        car.velocity = Velocity::new(2, 0);
        let mut wreck = cpu(1, 4, 0);
        wreck.status = Status::Crashed;

        assert_eq!(
            strategy.choose_acceleration(&car, &track, &[wreck]),
            accel(-1, 1)
        );
    }

    #[test]
    fn test_script_reads_candidates() {
        let mut strategy = script(
            r#"
            function chooseAcceleration()
                for _, c in ipairs(Race.candidates) do
                    if c.outcome == "wall" then return c.x, c.y end
                end
                return 0, 0
            end
            "#,
        );
        let track = corridor(&["  -", "   "]);
        assert_eq!(
            strategy.choose_acceleration(&cpu(0, 1, 0), &track, &[]),
            accel(-1, -1)
        );
    }

    #[test]
    fn test_state_survives_between_turns() {
        let mut strategy = script(
            r#"
            turn = 0
            function chooseAcceleration()
                turn = turn + 1
                if turn == 1 then return 1, 0 end
                return -1, 0
            end
            "#,
        );
        let track = corridor(&["     -"]);
        let car = cpu(0, 2, 0);
        assert_eq!(strategy.choose_acceleration(&car, &track, &[]), accel(1, 0));
        assert_eq!(strategy.choose_acceleration(&car, &track, &[]), accel(-1, 0));
    }

    #[test]
    fn test_out_of_range_answer_falls_back() {
        let mut strategy = script("function chooseAcceleration() return 3, 0 end");
        let track = corridor(&["      -"]);
        assert_eq!(
            strategy.choose_acceleration(&cpu(0, 0, 0), &track, &[]),
            accel(1, 0)
        );
    }

    #[test]
    fn test_runtime_error_falls_back() {
        let mut strategy = script("function chooseAcceleration() error('boom') end");
        let track = corridor(&["      -"]);
        assert_eq!(
            strategy.choose_acceleration(&cpu(0, 0, 0), &track, &[]),
            accel(1, 0)
        );
    }

    #[test]
    fn test_missing_entry_point() {
        let result = ScriptedStrategy::from_source("empty", "x = 1");
        assert!(matches!(result, Err(StrategyError::Script { .. })));
    }

    #[test]
    fn test_syntax_error() {
        let result = ScriptedStrategy::from_source("broken", "function (");
        assert!(matches!(result, Err(StrategyError::Script { .. })));
    }

    #[test]
    fn test_greedy_script_drives_the_hairpin() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scripts/greedy.lua");
        let mut strategy = ScriptedStrategy::from_file(path).unwrap();
        let track = hairpin();
        let mut car = cpu(0, 1, 1);

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

    #[test]
    fn test_missing_file() {
        let result = ScriptedStrategy::from_file("does/not/exist.lua");
        assert!(matches!(result, Err(StrategyError::Read { .. })));
    }
}
