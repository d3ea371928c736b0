//! Turn-based vector racing on a character grid.
//!
//! Each round every car still racing picks one of nine accelerations, its velocity changes by
//! that much and it travels along the straight line to its new position. Hitting a wall or
//! another car on the way ends its race; touching the finish line wins it.
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod car;
pub mod config;
pub mod controller;
pub mod engine;
pub mod movement;
pub mod render;
pub mod strategy;
pub mod track;
pub mod vector;
