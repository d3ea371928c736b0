use std::fmt;

use mlua::prelude::LuaError;
use mlua::{IntoLua, Lua, Value};
use serde::{Deserialize, Serialize};

use crate::vector::{Position, Velocity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CarId(pub usize);

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    Human,
    Cpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Racing,
    Finished,
    Crashed,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Racing => "racing",
            Status::Finished => "finished",
            Status::Crashed => "crashed",
        }
    }
}

/// The part of a car that changes from turn to turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarState {
    pub position: Position,
    pub velocity: Velocity,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    pub label: String,
    pub driver: Driver,
    pub position: Position,
    pub velocity: Velocity,
    pub status: Status,
}

impl Car {
    pub const fn new(id: CarId, label: String, driver: Driver, position: Position) -> Self {
        Self {
            id,
            label,
            driver,
            position,
            velocity: Velocity::ZERO,
            status: Status::Racing,
        }
    }

    pub fn is_racing(&self) -> bool {
        self.status == Status::Racing
    }

    pub const fn state(&self) -> CarState {
        CarState {
            position: self.position,
            velocity: self.velocity,
            status: self.status,
        }
    }
}

impl<'lua> IntoLua<'lua> for &Car {
    fn into_lua(self, lua: &'lua Lua) -> Result<Value<'lua>, LuaError> {
        let table = lua.create_table()?;
        table.set("id", self.id.0)?;
        table.set("label", self.label.as_str())?;
        table.set("x", self.position.x)?;
        table.set("y", self.position.y)?;
        table.set("vx", self.velocity.dx)?;
        table.set("vy", self.velocity.dy)?;
        table.set("status", self.status.as_str())?;
        Ok(Value::Table(table))
    }
}
