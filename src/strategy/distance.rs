use std::collections::VecDeque;

use crate::track::Track;
use crate::vector::Position;

/// Number of single-cell moves (diagonals included) from each drivable cell to the closest
/// finish cell, without crossing walls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceField {
    width: usize,
    distances: Vec<Option<u32>>,
}

impl DistanceField {
    pub fn to_finish(track: &Track) -> Self {
        let width = track.width();
        let mut distances = vec![None; width * track.height()];
        let mut queue = VecDeque::new();
        let index = |p: Position| p.y as usize * width + p.x as usize;

        for finish in track.finish_positions() {
            distances[index(finish)] = Some(0);
            queue.push_back(finish);
        }

        while let Some(current) = queue.pop_front() {
            let next = distances[index(current)].map_or(0, |d| d + 1);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let neighbour = Position::new(current.x + dx, current.y + dy);
                    let drivable = track
                        .cell_at(neighbour)
                        .is_ok_and(|cell| cell.is_drivable());
                    if drivable && distances[index(neighbour)].is_none() {
                        distances[index(neighbour)] = Some(next);
                        queue.push_back(neighbour);
                    }
                }
            }
        }

        Self { width, distances }
    }

    /// `None` for walls, cells outside of the track and cells cut off from the finish.
    pub fn get(&self, position: Position) -> Option<u32> {
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        if x >= self.width {
            return None;
        }
        self.distances.get(y * self.width + x).copied().flatten()
    }
}
