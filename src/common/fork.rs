//! Relation fork numbers.

use std::fmt;

use crate::common::{Error, Result};

/// One of the parallel files that make up a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ForkNumber {
    /// Main data.
    Main = 0,
    /// Free space map.
    FreeSpaceMap = 1,
    /// Visibility map.
    VisibilityMap = 2,
    /// Initialization fork for unlogged relations.
    Init = 3,
}

impl ForkNumber {
    /// Number of forks per relation.
    pub const COUNT: usize = 4;

    /// All forks, in fork-number order.
    pub const ALL: [ForkNumber; Self::COUNT] = [
        ForkNumber::Main,
        ForkNumber::FreeSpaceMap,
        ForkNumber::VisibilityMap,
        ForkNumber::Init,
    ];

    /// Highest valid fork number.
    pub const MAX: ForkNumber = ForkNumber::Init;

    /// Look up a fork by its name (`main`, `fsm`, `vm`, `init`).
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "main" => Ok(ForkNumber::Main),
            "fsm" => Ok(ForkNumber::FreeSpaceMap),
            "vm" => Ok(ForkNumber::VisibilityMap),
            "init" => Ok(ForkNumber::Init),
            _ => Err(Error::InvalidForkName(name.to_string())),
        }
    }

    /// Convert a raw fork number, rejecting values outside the fork range.
    pub fn from_i64(value: i64) -> Result<Self> {
        match value {
            0 => Ok(ForkNumber::Main),
            1 => Ok(ForkNumber::FreeSpaceMap),
            2 => Ok(ForkNumber::VisibilityMap),
            3 => Ok(ForkNumber::Init),
            _ => Err(Error::InvalidForkNumber(value)),
        }
    }

    /// Fork name as shown in reports.
    pub fn name(&self) -> &'static str {
        match self {
            ForkNumber::Main => "main",
            ForkNumber::FreeSpaceMap => "fsm",
            ForkNumber::VisibilityMap => "vm",
            ForkNumber::Init => "init",
        }
    }

    /// Position of this fork in per-relation arrays.
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ForkNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
