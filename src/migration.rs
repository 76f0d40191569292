//! The migration value type and its on-disk naming.

use std::fmt;

use serde::Serialize;

/// Scripts starting with this exact line are applied outside a transaction.
pub const NO_TRANSACTION_PREFIX: &str = "-- migrate: no-transaction\n";

/// Which script of a migration pair is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Filename component: `up` or `down`.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// `+` for up, `-` for down.
    pub fn sign(self) -> char {
        match self {
            Direction::Up => '+',
            Direction::Down => '-',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical schema change, backed by an up and a down script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Migration {
    pub version: i64,
    pub name: String,
}

impl Migration {
    pub fn new(version: i64, name: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
        }
    }

    /// `0001_name.up.sql` style filename; versions above 9999 widen.
    pub fn filename(&self, direction: Direction) -> String {
        format!("{:04}_{}.{}.sql", self.version, self.name, direction)
    }
}

impl fmt::Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}_{}", self.version, self.name)
    }
}
