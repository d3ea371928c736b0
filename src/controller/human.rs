use std::io::{self, BufRead, Cursor, Write};

use tracing::debug;

use super::{ControllerError, MoveProvider, RaceView};
use crate::car::{Car, Driver};
use crate::vector::Acceleration;

/// Somewhere answers are read from, one line at a time.
pub trait LineSource {
    /// Appends the raw bytes of the next line to `buf`; `Ok(0)` means there is nothing left to
    /// read.
    fn next_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize>;
}

/// Stdin is locked per line, so several players can share the terminal.
impl LineSource for io::Stdin {
    fn next_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        self.lock().read_until(b'\n', buf)
    }
}

impl<T: AsRef<[u8]>> LineSource for Cursor<T> {
    fn next_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        self.read_until(b'\n', buf)
    }
}

/// Asks a person for each move, one line per answer (`1 -1` or `1,-1`).
///
/// Bad answers are reported and asked again; the turn only ends with a legal acceleration or
/// when the input runs dry.
pub struct HumanInput<R, W> {
    input: R,
    output: W,
}

impl<R: LineSource, W: Write> HumanInput<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl HumanInput<io::Stdin, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin(), io::stdout())
    }
}

impl<R: LineSource, W: Write> MoveProvider for HumanInput<R, W> {
    fn driver(&self) -> Driver {
        Driver::Human
    }

    fn acceleration_for(
        &mut self,
        car: &Car,
        view: &RaceView<'_>,
    ) -> Result<Acceleration, ControllerError> {
        let mut line = Vec::new();
        loop {
            write!(
                self.output,
                "Round {} | {} (car {}) at {} moving {}. Acceleration (x y, each -1..1): ",
                view.round, car.label, car.id, car.position, car.velocity
            )?;
            self.output.flush()?;

            line.clear();
            if self.input.next_line(&mut line)? == 0 {
                return Err(ControllerError::InputClosed(car.id));
            }

            let Ok(text) = std::str::from_utf8(&line) else {
                debug!(car = %car.id, bytes = line.len(), "rejected undecodable human input");
                writeln!(self.output, "input is not valid UTF-8, try again")?;
                continue;
            };

            match text.parse::<Acceleration>() {
                Ok(acceleration) => return Ok(acceleration),
                Err(e) => {
                    debug!(car = %car.id, input = text.trim(), "rejected human input");
                    writeln!(self.output, "{e}, try again")?;
                }
            }
        }
    }
}
