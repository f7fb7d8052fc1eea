//! Presence activity vocabulary: the activity kind and the activity flag bit set.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

/// What a presence activity describes. Code 3 is not part of the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ActivityType {
    /// "Playing {name}"
    Game,
    /// "Streaming {details}"
    Streaming,
    /// "Listening to {name}"
    Listening,
    /// "{emoji} {name}"
    Custom,
    /// "Competing in {name}"
    Competing,
}

impl ActivityType {
    pub fn code(self) -> i64 {
        match self {
            ActivityType::Game => 0,
            ActivityType::Streaming => 1,
            ActivityType::Listening => 2,
            ActivityType::Custom => 4,
            ActivityType::Competing => 5,
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(ActivityType::Game),
            1 => Ok(ActivityType::Streaming),
            2 => Ok(ActivityType::Listening),
            4 => Ok(ActivityType::Custom),
            5 => Ok(ActivityType::Competing),
            other => Err(GatewayError::InvalidConfiguration(format!(
                "unknown activity type: {other}"
            ))),
        }
    }
}

impl TryFrom<i64> for ActivityType {
    type Error = GatewayError;

    fn try_from(code: i64) -> Result<Self> {
        ActivityType::from_code(code)
    }
}

impl From<ActivityType> for i64 {
    fn from(t: ActivityType) -> i64 {
        t.code()
    }
}

/// Validated activity flags. Only bits in [`ActivityFlags::ALL`] can be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct ActivityFlags(u8);

impl ActivityFlags {
    pub const NONE: ActivityFlags = ActivityFlags(0);
    pub const INSTANCE: ActivityFlags = ActivityFlags(1 << 0);
    pub const JOIN: ActivityFlags = ActivityFlags(1 << 1);
    pub const SPECTATE: ActivityFlags = ActivityFlags(1 << 2);
    pub const JOIN_REQUEST: ActivityFlags = ActivityFlags(1 << 3);
    pub const SYNC: ActivityFlags = ActivityFlags(1 << 4);
    pub const PLAY: ActivityFlags = ActivityFlags(1 << 5);

    pub const ALL: ActivityFlags = ActivityFlags((1 << 6) - 1);

    const NAMED: [(&'static str, ActivityFlags); 6] = [
        ("instance", ActivityFlags::INSTANCE),
        ("join", ActivityFlags::JOIN),
        ("spectate", ActivityFlags::SPECTATE),
        ("join_request", ActivityFlags::JOIN_REQUEST),
        ("sync", ActivityFlags::SYNC),
        ("play", ActivityFlags::PLAY),
    ];

    pub fn from_mask(mask: i64) -> Result<Self> {
        if !(0..=i64::from(ActivityFlags::ALL.0)).contains(&mask) {
            return Err(GatewayError::InvalidConfiguration(format!(
                "activity flags {mask:#x} outside {:#x}",
                ActivityFlags::ALL.0
            )));
        }
        u8::try_from(mask)
            .map(ActivityFlags)
            .map_err(|e| GatewayError::InvalidConfiguration(format!("activity flags: {e}")))
    }

    pub fn from_name(name: &str) -> Result<Self> {
        ActivityFlags::NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
            .ok_or_else(|| GatewayError::InvalidConfiguration(format!("unknown activity flag: {name}")))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: ActivityFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<i64> for ActivityFlags {
    type Error = GatewayError;

    fn try_from(mask: i64) -> Result<Self> {
        ActivityFlags::from_mask(mask)
    }
}

impl From<ActivityFlags> for u8 {
    fn from(f: ActivityFlags) -> u8 {
        f.0
    }
}

impl BitOr for ActivityFlags {
    type Output = ActivityFlags;

    fn bitor(self, rhs: ActivityFlags) -> ActivityFlags {
        ActivityFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ActivityFlags {
    fn bitor_assign(&mut self, rhs: ActivityFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ActivityFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
