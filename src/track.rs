//! The race track: an immutable grid of road, wall and finish cells plus the start line.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vector::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Road,
    Wall,
    Finish,
}

impl CellType {
    pub const fn symbol(self) -> char {
        match self {
            CellType::Road => ' ',
            CellType::Wall => '*',
            CellType::Finish => '-',
        }
    }

    pub const fn is_drivable(self) -> bool {
        !matches!(self, CellType::Wall)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    #[error("position {0} is outside of the track")]
    OutOfBounds(Position),
    #[error("track must be at least 1x1, got {width}x{height}")]
    Empty { width: usize, height: usize },
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("{width}x{height} track needs {expected} cells, got {found}")]
    CellCount {
        width: usize,
        height: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown track symbol {symbol:?} at {position}")]
    UnknownSymbol { symbol: char, position: Position },
    #[error("start cell {0} is not a drivable cell inside the track")]
    InvalidStart(Position),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    width: usize,
    height: usize,
    cells: Vec<CellType>,
    starts: Vec<Position>,
}

impl Track {
    /// Builds a track from row-major `cells`. `starts` is the start line in join order.
    pub fn new(
        width: usize,
        height: usize,
        cells: Vec<CellType>,
        starts: Vec<Position>,
    ) -> Result<Self, TrackError> {
        if width == 0 || height == 0 {
            return Err(TrackError::Empty { width, height });
        }
        if cells.len() != width * height {
            return Err(TrackError::CellCount {
                width,
                height,
                expected: width * height,
                found: cells.len(),
            });
        }

        let track = Self {
            width,
            height,
            cells,
            starts,
        };
        if let Some(start) = track
            .starts
            .iter()
            .find(|s| !track.cell_at(**s).is_ok_and(CellType::is_drivable))
        {
            return Err(TrackError::InvalidStart(*start));
        }

        Ok(track)
    }

    /// Parses rows of `*` (wall), ` ` (road), `+` (start) and `-` (finish).
    ///
    /// Start cells are road cells; they join the start line in row-major order.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, TrackError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
        let mut cells = Vec::with_capacity(width * height);
        let mut starts = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(TrackError::RaggedRow {
                    row: y,
                    found,
                    expected: width,
                });
            }
            for (x, symbol) in row.chars().enumerate() {
                let position = Position::new(x as i32, y as i32);
                cells.push(match symbol {
                    '*' => CellType::Wall,
                    ' ' => CellType::Road,
                    '-' => CellType::Finish,
                    '+' => {
                        starts.push(position);
                        CellType::Road
                    }
                    _ => return Err(TrackError::UnknownSymbol { symbol, position }),
                });
            }
        }

        Self::new(width, height, cells, starts)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    fn index(&self, position: Position) -> Option<usize> {
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    pub fn cell_at(&self, position: Position) -> Result<CellType, TrackError> {
        self.index(position)
            .map(|i| self.cells[i])
            .ok_or(TrackError::OutOfBounds(position))
    }

    /// `false` outside of the track.
    pub fn is_finish(&self, position: Position) -> bool {
        self.cell_at(position) == Ok(CellType::Finish)
    }

    pub fn start_positions(&self) -> &[Position] {
        &self.starts
    }

    pub fn is_start(&self, position: Position) -> bool {
        self.starts.contains(&position)
    }

    pub fn finish_positions(&self) -> Vec<Position> {
        self.positions()
            .filter(|p| self.is_finish(*p))
            .collect()
    }

    /// Every cell coordinate in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| Position::new(x as i32, y as i32))
        })
    }

    /// Symbol grid as it would be written in a configuration file.
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width)
            .enumerate()
            .map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .map(|(x, cell)| {
                        if self.is_start(Position::new(x as i32, y as i32)) {
                            '+'
                        } else {
                            cell.symbol()
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::tests::hairpin;

    #[test]
    fn test_from_rows() {
        let track = Track::from_rows(&["*****", "*+ -*", "*****"]).unwrap();
        assert_eq!(track.width(), 5);
        assert_eq!(track.height(), 3);
        assert_eq!(track.cell_at(Position::new(0, 0)), Ok(CellType::Wall));
        assert_eq!(track.cell_at(Position::new(1, 1)), Ok(CellType::Road));
        assert_eq!(track.cell_at(Position::new(2, 1)), Ok(CellType::Road));
        assert_eq!(track.cell_at(Position::new(3, 1)), Ok(CellType::Finish));
        assert_eq!(track.start_positions(), &[Position::new(1, 1)]);
        assert_eq!(track.finish_positions(), vec![Position::new(3, 1)]);
    }

    #[rstest]
    #[case(Position::new(-1, 0))]
    #[case(Position::new(0, -1))]
    #[case(Position::new(5, 0))]
    #[case(Position::new(0, 3))]
    fn test_cell_at_out_of_bounds(#[case] position: Position) {
        let track = Track::from_rows(&["*****", "*+ -*", "*****"]).unwrap();
        assert_eq!(track.cell_at(position), Err(TrackError::OutOfBounds(position)));
        assert!(!track.contains(position));
        assert!(!track.is_finish(position));
    }

    #[test]
    fn test_start_order_is_row_major() {
        let track = hairpin();
        let starts = track.start_positions();
        assert!(!starts.is_empty());
        assert!(starts
            .windows(2)
            .all(|w| (w[0].y, w[0].x) < (w[1].y, w[1].x)));
    }

    #[test]
    fn test_cell_count_must_match_the_size() {
        assert_eq!(
            Track::new(3, 2, vec![CellType::Road; 5], Vec::new()),
            Err(TrackError::CellCount {
                width: 3,
                height: 2,
                expected: 6,
                found: 5
            })
        );
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        assert_eq!(
            Track::from_rows(&["***", "**"]),
            Err(TrackError::RaggedRow {
                row: 1,
                found: 2,
                expected: 3
            })
        );
    }

    #[test]
    fn test_unknown_symbol_is_rejected() {
        assert_eq!(
            Track::from_rows(&["*x*"]),
            Err(TrackError::UnknownSymbol {
                symbol: 'x',
                position: Position::new(1, 0)
            })
        );
    }

    #[test]
    fn test_empty_track_is_rejected() {
        let rows: [&str; 0] = [];
        assert_eq!(
            Track::from_rows(&rows),
            Err(TrackError::Empty {
                width: 0,
                height: 0
            })
        );
    }

    #[test]
    fn test_start_on_wall_is_rejected() {
        assert_eq!(
            Track::new(
                2,
                1,
                vec![CellType::Wall, CellType::Road],
                vec![Position::new(0, 0)]
            ),
            Err(TrackError::InvalidStart(Position::new(0, 0)))
        );
    }

    #[test]
    fn test_rows_round_trip_symbols() {
        let rows = ["*****", "*+ -*", "*****"];
        let track = Track::from_rows(&rows).unwrap();
        assert_eq!(track.rows(), rows);
    }
}
