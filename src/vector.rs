//! Integer grid vectors: positions, velocities and the nine legal accelerations.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A cell coordinate. `x` is the column, `y` the row, both counted from the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add<Velocity> for Position {
    type Output = Position;

    fn add(self, rhs: Velocity) -> Self::Output {
        Position::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cells travelled per turn. Never clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Velocity {
    pub dx: i32,
    pub dy: i32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity::new(0, 0);

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub const fn is_zero(self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    pub fn speed(self) -> f64 {
        f64::from(self.dx).hypot(f64::from(self.dy))
    }
}

impl Add<Acceleration> for Velocity {
    type Output = Velocity;

    fn add(self, rhs: Acceleration) -> Self::Output {
        Velocity::new(self.dx + i32::from(rhs.ax), self.dy + i32::from(rhs.ay))
    }
}

impl fmt::Display for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.dx, self.dy)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccelerationError {
    #[error("acceleration component {0} is outside of -1..=1")]
    OutOfRange(i64),
    #[error("expected two integers like `1 -1`, got {0:?}")]
    Malformed(String),
}

/// Velocity change for one turn. Both components are always in `-1..=1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(i32, i32)", into = "(i32, i32)")]
pub struct Acceleration {
    ax: i8,
    ay: i8,
}

impl Acceleration {
    pub const ZERO: Acceleration = Acceleration { ax: 0, ay: 0 };

    /// Every legal acceleration, row by row from `(-1, -1)` to `(1, 1)`.
    pub const ALL: [Acceleration; 9] = [
        Acceleration { ax: -1, ay: -1 },
        Acceleration { ax: 0, ay: -1 },
        Acceleration { ax: 1, ay: -1 },
        Acceleration { ax: -1, ay: 0 },
        Acceleration { ax: 0, ay: 0 },
        Acceleration { ax: 1, ay: 0 },
        Acceleration { ax: -1, ay: 1 },
        Acceleration { ax: 0, ay: 1 },
        Acceleration { ax: 1, ay: 1 },
    ];

    pub fn new(ax: i64, ay: i64) -> Result<Self, AccelerationError> {
        Ok(Self {
            ax: Self::component(ax)?,
            ay: Self::component(ay)?,
        })
    }

    fn component(value: i64) -> Result<i8, AccelerationError> {
        match value {
            -1..=1 => Ok(value as i8),
            _ => Err(AccelerationError::OutOfRange(value)),
        }
    }

    pub const fn ax(self) -> i32 {
        self.ax as i32
    }

    pub const fn ay(self) -> i32 {
        self.ay as i32
    }
}

impl TryFrom<(i32, i32)> for Acceleration {
    type Error = AccelerationError;

    fn try_from((ax, ay): (i32, i32)) -> Result<Self, Self::Error> {
        Self::new(i64::from(ax), i64::from(ay))
    }
}

impl From<Acceleration> for (i32, i32) {
    fn from(value: Acceleration) -> Self {
        (value.ax(), value.ay())
    }
}

impl FromStr for Acceleration {
    type Err = AccelerationError;

    /// Accepts `dx dy` or `dx,dy`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        let [ax, ay] = parts.as_slice() else {
            return Err(AccelerationError::Malformed(s.trim().to_owned()));
        };
        let parse = |part: &str| {
            part.parse::<i64>()
                .map_err(|_| AccelerationError::Malformed(s.trim().to_owned()))
        };
        Self::new(parse(ax)?, parse(ay)?)
    }
}

impl fmt::Display for Acceleration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:+}, {:+}]", self.ax, self.ay)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_all_accelerations_are_distinct() {
        let mut all = Acceleration::ALL.to_vec();
        all.sort_by_key(|a| (a.ay(), a.ax()));
        all.dedup();
        assert_eq!(all.len(), 9);
    }

    #[rstest]
    #[case(2, 0)]
    #[case(0, -2)]
    #[case(-5, 7)]
    fn test_out_of_range_components_are_rejected(#[case] ax: i64, #[case] ay: i64) {
        assert!(matches!(
            Acceleration::new(ax, ay),
            Err(AccelerationError::OutOfRange(_))
        ));
    }

    #[rstest]
    #[case("1 0", (1, 0))]
    #[case("-1,1", (-1, 1))]
    #[case("  0   -1 ", (0, -1))]
    #[case("1, 1", (1, 1))]
    fn test_parse(#[case] input: &str, #[case] expected: (i32, i32)) {
        let acceleration: Acceleration = input.parse().unwrap();
        assert_eq!(<(i32, i32)>::from(acceleration), expected);
    }

    #[rstest]
    #[case("")]
    #[case("1")]
    #[case("a b")]
    #[case("1 0 1")]
    fn test_parse_malformed(#[case] input: &str) {
        assert!(matches!(
            input.parse::<Acceleration>(),
            Err(AccelerationError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_out_of_range() {
        assert_eq!(
            "3 0".parse::<Acceleration>(),
            Err(AccelerationError::OutOfRange(3))
        );
    }

    #[test]
    fn test_velocity_is_not_clamped() {
        let mut velocity = Velocity::new(40, -40);
        velocity = velocity + Acceleration::new(1, -1).unwrap();
        assert_eq!(velocity, Velocity::new(41, -41));
        assert_eq!(Position::new(2, 3) + velocity, Position::new(43, -38));
    }

    #[test]
    fn test_acceleration_serde_uses_pairs() {
        let acceleration = Acceleration::new(-1, 1).unwrap();
        assert_eq!(serde_json::to_string(&acceleration).unwrap(), "[-1,1]");
        assert!(serde_json::from_str::<Acceleration>("[2,0]").is_err());
    }
}
