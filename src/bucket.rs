//! Time-bucket keys.
//!
//! A [`BucketKey`] names the frame that is valid right now: the number of
//! hours elapsed since the first hour of January 1st (UTC), 1-based, printed
//! as four zero-padded digits. It grows through the year and resets on
//! January 1st.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width of the printed key.
pub const KEY_WIDTH: usize = 4;

/// How the current instant is mapped onto an hour bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Truncate to the current hour.
    Hour,
    /// Round minutes to the nearest hour (minute 30 and later rounds up).
    #[default]
    NearestHour,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hour" => Ok(Self::Hour),
            "nearest_hour" | "nearest-hour" => Ok(Self::NearestHour),
            _ => Err(format!("unknown granularity: {}", s)),
        }
    }
}

/// Identifier of the resource version expected at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey(u32);

impl BucketKey {
    /// Wrap a raw hour index.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// The hour index.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = KEY_WIDTH)
    }
}

impl FromStr for BucketKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != KEY_WIDTH || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid bucket key: {:?}", s));
        }
        s.parse::<u32>()
            .map(Self)
            .map_err(|e| format!("invalid bucket key {:?}: {}", s, e))
    }
}

/// Compute the bucket key for an instant.
///
/// `(day_of_year * 24 - 23) + hour`, with minutes folded in when the
/// granularity rounds to the nearest hour.
pub fn bucket_key(now: DateTime<Utc>, granularity: Granularity) -> BucketKey {
    let hours = now.ordinal() * 24 - 23 + now.hour();
    let index = match granularity {
        Granularity::Hour => hours,
        Granularity::NearestHour => (hours * 60 + now.minute() + 30) / 60,
    };
    BucketKey(index)
}
