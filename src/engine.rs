//! The race itself: who moves when, what a move does to a car and when the race is over.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::car::{Car, CarId, CarState, Status};
use crate::controller::{ControllerError, MoveProvider, RaceView};
use crate::movement::{self, MoveOutcome, Occupant};
use crate::track::Track;
use crate::vector::Acceleration;

pub const DEFAULT_MAX_ROUNDS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceSettings {
    /// The race is called off after this many rounds without a winner.
    pub max_rounds: usize,
    pub seed: Option<u64>,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceResult {
    Winner(CarId),
    /// Every car crashed.
    NoWinner,
    RoundLimit,
}

/// One committed turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvent {
    pub round: usize,
    pub car: CarId,
    pub acceleration: Acceleration,
    pub before: CarState,
    pub after: CarState,
    pub outcome: MoveOutcome,
}

/// Everything needed to replay a race.
#[derive(Debug, Clone, Serialize)]
pub struct RaceLog<'a> {
    pub track: Vec<String>,
    pub cars: &'a [Car],
    pub events: &'a [TurnEvent],
    pub result: Option<RaceResult>,
}

#[derive(Error, Debug)]
pub enum RaceError {
    #[error("cars can only join before the race starts (race is {0:?})")]
    AlreadyStarted(Phase),
    #[error("race is {0:?}, not running")]
    NotRunning(Phase),
    #[error("no start cell left for car {car}, the track has {available}")]
    NoStartCell { car: CarId, available: usize },
    #[error("a race needs at least one car")]
    NoCars,
    #[error("no move for car {car}")]
    Controller {
        car: CarId,
        #[source]
        source: ControllerError,
    },
    #[error("failed to write the race log")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize the race log")]
    Json(#[from] serde_json::Error),
}

pub struct RaceEngine {
    track: Track,
    settings: RaceSettings,
    phase: Phase,
    round: usize,
    cars: Vec<Car>,
    providers: Vec<Box<dyn MoveProvider>>,
    events: Vec<TurnEvent>,
    winner: Option<CarId>,
    result: Option<RaceResult>,
}

impl RaceEngine {
    pub fn new(track: Track, settings: RaceSettings) -> Self {
        Self {
            track,
            settings,
            phase: Phase::Setup,
            round: 0,
            cars: Vec::new(),
            providers: Vec::new(),
            events: Vec::new(),
            winner: None,
            result: None,
        }
    }

    /// Adds a car on the next free start cell. Cars move in the order they joined.
    pub fn register(
        &mut self,
        label: impl Into<String>,
        provider: Box<dyn MoveProvider>,
    ) -> Result<CarId, RaceError> {
        if self.phase != Phase::Setup {
            return Err(RaceError::AlreadyStarted(self.phase));
        }

        let id = CarId(self.cars.len());
        let starts = self.track.start_positions();
        let Some(&position) = starts.get(id.0) else {
            return Err(RaceError::NoStartCell {
                car: id,
                available: starts.len(),
            });
        };

        let car = Car::new(id, label.into(), provider.driver(), position);
        debug!(car = %id, label = %car.label, %position, "car registered");
        self.cars.push(car);
        self.providers.push(provider);
        Ok(id)
    }

    pub fn start(&mut self) -> Result<(), RaceError> {
        if self.phase != Phase::Setup {
            return Err(RaceError::AlreadyStarted(self.phase));
        }
        if self.cars.is_empty() {
            return Err(RaceError::NoCars);
        }

        self.phase = Phase::Running;
        info!(cars = self.cars.len(), max_rounds = self.settings.max_rounds, "race started");
        Ok(())
    }

    /// Plays one turn for every car still racing and returns the turns played. The round stops
    /// early as soon as a car crosses the finish line.
    pub fn play_round(&mut self) -> Result<&[TurnEvent], RaceError> {
        if self.phase != Phase::Running {
            return Err(RaceError::NotRunning(self.phase));
        }

        self.round += 1;
        let first = self.events.len();
        for index in 0..self.cars.len() {
            if !self.cars[index].is_racing() {
                continue;
            }
            let event = self.play_turn(index)?;
            self.events.push(event);
            if self.winner.is_some() {
                break;
            }
        }

        if let Some(winner) = self.winner {
            self.finish(RaceResult::Winner(winner));
        } else if self.cars.iter().all(|car| car.status == Status::Crashed) {
            self.finish(RaceResult::NoWinner);
        } else if self.round >= self.settings.max_rounds {
            self.finish(RaceResult::RoundLimit);
        }

        Ok(&self.events[first..])
    }

    /// Runs the race to the end.
    pub fn race(&mut self) -> Result<RaceResult, RaceError> {
        if self.phase == Phase::Setup {
            self.start()?;
        }
        while self.phase == Phase::Running {
            self.play_round()?;
        }
        self.result.ok_or(RaceError::NotRunning(self.phase))
    }

    fn play_turn(&mut self, index: usize) -> Result<TurnEvent, RaceError> {
        let view = RaceView {
            track: &self.track,
            cars: &self.cars,
            round: self.round,
        };
        let car = &self.cars[index];
        let acceleration = self.providers[index]
            .acceleration_for(car, &view)
            .map_err(|source| RaceError::Controller {
                car: car.id,
                source,
            })?;

        let occupants = Occupant::racing_except(&self.cars, car.id);
        let outcome =
            movement::resolve(&self.track, car.position, car.velocity, acceleration, &occupants);

        let car = &mut self.cars[index];
        let before = car.state();
        match outcome {
            MoveOutcome::Legal { position, velocity } => {
                car.position = position;
                car.velocity = velocity;
            }
            MoveOutcome::WallCollision { .. } | MoveOutcome::CarCollision { .. } => {
                car.status = Status::Crashed;
            }
            MoveOutcome::FinishCrossed { at, velocity } => {
                car.position = at;
                car.velocity = velocity;
                car.status = Status::Finished;
                self.winner.get_or_insert(car.id);
            }
        }

        debug!(
            round = self.round,
            car = %car.id,
            %acceleration,
            outcome = outcome.tag(),
            position = %car.position,
            velocity = %car.velocity,
            "turn played"
        );

        Ok(TurnEvent {
            round: self.round,
            car: car.id,
            acceleration,
            before,
            after: car.state(),
            outcome,
        })
    }

    fn finish(&mut self, result: RaceResult) {
        self.phase = Phase::Finished;
        self.result = Some(result);
        info!(round = self.round, ?result, "race finished");
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn winner(&self) -> Option<CarId> {
        self.winner
    }

    pub fn result(&self) -> Option<RaceResult> {
        self.result
    }

    pub fn events(&self) -> &[TurnEvent] {
        &self.events
    }

    pub fn log(&self) -> RaceLog<'_> {
        RaceLog {
            track: self.track.rows(),
            cars: &self.cars,
            events: &self.events,
            result: self.result,
        }
    }

    pub fn export_log<W: Write>(&self, writer: W) -> Result<(), RaceError> {
        serde_json::to_writer(writer, &self.log())?;
        Ok(())
    }

    /// Writes the log to `dir/logs_<unix time>.json` and returns the file path.
    pub fn export_log_file(&self, dir: impl AsRef<Path>) -> Result<PathBuf, RaceError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let time_now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let path = dir.join(format!("logs_{time_now}.json"));

        let mut writer = BufWriter::new(File::create(&path)?);
        self.export_log(&mut writer)?;
        writer.flush()?;
        info!(path = %path.display(), "race log written");
        Ok(path)
    }
}
