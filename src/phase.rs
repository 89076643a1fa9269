//! Moon phase symbols.
//!
//! The synodic age of the moon is computed from the Julian day of a calendar
//! date, measured from the new moon of 2000-01-06, and looked up in an
//! ordered threshold table.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of one synodic month in days.
pub const SYNODIC_MONTH: f64 = 29.530588853;

/// Observer hemisphere. Phases appear mirrored in the south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    #[default]
    North,
    South,
}

impl FromStr for Hemisphere {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "north" | "n" => Ok(Self::North),
            "south" | "s" => Ok(Self::South),
            _ => Err(format!("unknown hemisphere: {}", s)),
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::North => write!(f, "north"),
            Self::South => write!(f, "south"),
        }
    }
}

/// Ordered `(age_in_days, symbol)` thresholds covering `[0, SYNODIC_MONTH)`.
#[derive(Debug, Clone)]
pub struct PhaseTable {
    thresholds: Vec<(f64, &'static str)>,
}

const DEFAULT_THRESHOLDS: [(f64, &str); 9] = [
    (0.0, "🌑"),
    (1.84566, "🌒"),
    (5.53588, "🌓"),
    (9.22831, "🌔"),
    (12.91963, "🌕"),
    (16.61069, "🌖"),
    (20.30228, "🌗"),
    (23.99361, "🌘"),
    (27.68493, "🌑"),
];

impl Default for PhaseTable {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
        }
    }
}

impl PhaseTable {
    /// Build a table, checking that it starts at zero, stays below one
    /// synodic month and is strictly increasing.
    pub fn new(thresholds: Vec<(f64, &'static str)>) -> Result<Self, String> {
        match thresholds.first() {
            Some((first, _)) if *first == 0.0 => {}
            _ => return Err("phase table must start at age 0".to_string()),
        }
        if thresholds.windows(2).any(|w| w[0].0 >= w[1].0) {
            return Err("phase thresholds must be strictly increasing".to_string());
        }
        if thresholds.iter().any(|(age, _)| *age >= SYNODIC_MONTH) {
            return Err("phase thresholds must be below one synodic month".to_string());
        }
        Ok(Self { thresholds })
    }

    /// Symbol of the greatest threshold not above `age`.
    ///
    /// `age` is reduced into `[0, SYNODIC_MONTH)` first.
    pub fn symbol_for_age(&self, age: f64) -> &'static str {
        let age = age.rem_euclid(SYNODIC_MONTH);
        let idx = self.thresholds.partition_point(|(threshold, _)| *threshold <= age);
        self.thresholds[idx.saturating_sub(1)].1
    }

    /// The thresholds in order.
    pub fn thresholds(&self) -> &[(f64, &'static str)] {
        &self.thresholds
    }
}

/// Julian day number of a Gregorian calendar date at 0h UT.
pub fn julian_day(year: i32, month: u32, day: u32) -> f64 {
    let (mut year, mut month) = (year as i64, month as i64);
    if month <= 2 {
        year -= 1;
        month += 12;
    }
    let a = year.div_euclid(100);
    let b = a.div_euclid(4);
    let c = 2 - a + b;
    let e = (365.25 * (year + 4716) as f64).floor();
    let f = (30.6001 * (month + 1) as f64).floor();
    c as f64 + day as f64 + e + f - 1524.5
}

/// Days since the most recent new moon, in `[0, SYNODIC_MONTH)`.
pub fn synodic_age(date: NaiveDate) -> f64 {
    let jd = julian_day(date.year(), date.month(), date.day());
    (jd - julian_day(2000, 1, 6)).rem_euclid(SYNODIC_MONTH)
}

/// Phase symbol for a date, as seen from `hemisphere`.
pub fn phase_symbol(date: NaiveDate, hemisphere: Hemisphere) -> &'static str {
    PhaseTable::default().symbol_for(date, hemisphere)
}

impl PhaseTable {
    /// Phase symbol for a date using this table.
    pub fn symbol_for(&self, date: NaiveDate, hemisphere: Hemisphere) -> &'static str {
        let age = synodic_age(date);
        match hemisphere {
            Hemisphere::North => self.symbol_for_age(age),
            Hemisphere::South => self.symbol_for_age(SYNODIC_MONTH - age),
        }
    }
}

/// Append the phase symbol to a display name.
pub fn name_with_phase(current: &str, symbol: &str) -> String {
    format!("{} {}", current, symbol)
}
