//! Plain-text picture of the race, one character per cell.

use crate::car::{Car, Status};
use crate::track::Track;

/// Draws the track with every car that has not crashed shown as the last digit of its id, then
/// a status line or two.
pub fn render(track: &Track, cars: &[Car]) -> String {
    let mut grid: Vec<Vec<char>> = track.rows().iter().map(|row| row.chars().collect()).collect();

    for car in cars.iter().filter(|car| car.status != Status::Crashed) {
        let (Ok(x), Ok(y)) = (usize::try_from(car.position.x), usize::try_from(car.position.y))
        else {
            continue;
        };
        if let Some(cell) = grid.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = char::from_digit((car.id.0 % 10) as u32, 10).unwrap_or('?');
        }
    }

    let mut out = String::new();
    for row in grid {
        out.extend(row);
        out.push('\n');
    }

    let on_marks = cars
        .iter()
        .filter(|car| car.status != Status::Crashed)
        .all(|car| track.is_start(car.position));
    if on_marks {
        out.push_str("Players on their marks\n");
    }

    let crashed: Vec<String> = cars
        .iter()
        .filter(|car| car.status == Status::Crashed)
        .map(|car| car.id.to_string())
        .collect();
    if !crashed.is_empty() {
        out.push_str(&format!("Crashed players: {}\n", crashed.join(" ")));
    }

    out
}
