use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TsMathError;

pub const NS_PER_MICROSECOND: i64 = 1_000;
pub const NS_PER_MILLISECOND: i64 = 1_000_000;
pub const NS_PER_SECOND: i64 = 1_000_000_000;
pub const NS_PER_MINUTE: i64 = 60 * NS_PER_SECOND;
pub const NS_PER_HOUR: i64 = 3_600 * NS_PER_SECOND;
pub const NS_PER_DAY: i64 = 86_400 * NS_PER_SECOND;

/// Fixed-length time unit. Calendar units (month, year) are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
}

impl Unit {
    pub const ALL: [Unit; 7] = [
        Unit::Nanosecond,
        Unit::Microsecond,
        Unit::Millisecond,
        Unit::Second,
        Unit::Minute,
        Unit::Hour,
        Unit::Day,
    ];

    /// Length of one unit in nanoseconds.
    pub const fn nanos(self) -> i64 {
        match self {
            Unit::Nanosecond => 1,
            Unit::Microsecond => NS_PER_MICROSECOND,
            Unit::Millisecond => NS_PER_MILLISECOND,
            Unit::Second => NS_PER_SECOND,
            Unit::Minute => NS_PER_MINUTE,
            Unit::Hour => NS_PER_HOUR,
            Unit::Day => NS_PER_DAY,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Unit::Nanosecond => "nanosecond",
            Unit::Microsecond => "microsecond",
            Unit::Millisecond => "millisecond",
            Unit::Second => "second",
            Unit::Minute => "minute",
            Unit::Hour => "hour",
            Unit::Day => "day",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Unit {
    type Err = TsMathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::ALL
            .into_iter()
            .find(|u| u.name() == s)
            .ok_or_else(|| TsMathError::invalid_params(format!("unknown unit {s:?}")))
    }
}
