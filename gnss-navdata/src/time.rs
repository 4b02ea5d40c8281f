//! Navigation time handling
//!
//! [`NavTime`] is an instant counted in integer nanoseconds from the GPS epoch
//! (1980-01-06 00:00:00) in its own time system. Two times compare by their
//! counts only; callers needing cross-system comparison convert first with
//! [`NavTime::to_system_coarse`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

pub const SEC_PER_WEEK: i64 = 604_800;
pub const SEC_PER_DAY: i64 = 86_400;
const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Unix timestamp of the GPS epoch
const GPS_EPOCH_UNIX: i64 = 315_964_800;

/// BeiDou time runs 14 seconds behind GPS time
const BDT_GPS_OFFSET: i64 = 14;

/// GLONASS time is UTC(SU) + 3 hours
const GLO_UTC_OFFSET: i64 = 3 * 3600;

/// Date (UTC) each GPS-UTC leap second count took effect
const LEAP_SECONDS: [(i32, u32, i64); 18] = [
    (1981, 7, 1),
    (1982, 7, 2),
    (1983, 7, 3),
    (1985, 7, 4),
    (1988, 1, 5),
    (1990, 1, 6),
    (1991, 1, 7),
    (1992, 7, 8),
    (1993, 7, 9),
    (1994, 7, 10),
    (1996, 1, 11),
    (1997, 7, 12),
    (1999, 1, 13),
    (2006, 1, 14),
    (2009, 1, 15),
    (2012, 7, 16),
    (2015, 7, 17),
    (2017, 1, 18),
];

/// Time system a [`NavTime`] is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeSystem {
    Any,
    Gps,
    Gal,
    Glo,
    Qzs,
    Bdt,
    Utc,
}

impl fmt::Display for TimeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSystem::Any => write!(f, "Any"),
            TimeSystem::Gps => write!(f, "GPS"),
            TimeSystem::Gal => write!(f, "GAL"),
            TimeSystem::Glo => write!(f, "GLO"),
            TimeSystem::Qzs => write!(f, "QZS"),
            TimeSystem::Bdt => write!(f, "BDT"),
            TimeSystem::Utc => write!(f, "UTC"),
        }
    }
}

/// An instant in a navigation time system
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NavTime {
    nanos: i64,
    system: TimeSystem,
}

impl NavTime {
    /// Earliest representable time, reported by empty stores as their final time
    pub const BEGINNING_OF_TIME: NavTime = NavTime {
        nanos: i64::MIN,
        system: TimeSystem::Any,
    };

    /// Latest representable time, reported by empty stores as their initial time
    pub const END_OF_TIME: NavTime = NavTime {
        nanos: i64::MAX,
        system: TimeSystem::Any,
    };

    /// Create a time from whole seconds since the GPS epoch
    pub fn from_seconds(system: TimeSystem, seconds: f64) -> Self {
        Self {
            nanos: seconds_to_nanos(seconds),
            system,
        }
    }

    /// Create a time from a full week number and second of week
    pub fn from_week_second(system: TimeSystem, week: i64, sow: f64) -> Self {
        let whole = week.saturating_mul(SEC_PER_WEEK).saturating_mul(NANOS_PER_SEC);
        Self {
            nanos: whole.saturating_add(seconds_to_nanos(sow)),
            system,
        }
    }

    pub fn system(&self) -> TimeSystem {
        self.system
    }

    /// Same instant count relabeled with another time system
    pub fn with_system(self, system: TimeSystem) -> Self {
        Self { system, ..self }
    }

    pub fn is_sentinel(&self) -> bool {
        self.nanos == i64::MIN || self.nanos == i64::MAX
    }

    /// Seconds since the GPS epoch
    pub fn as_seconds(&self) -> f64 {
        self.nanos as f64 / NANOS_PER_SEC as f64
    }

    pub fn week(&self) -> i64 {
        self.nanos.div_euclid(SEC_PER_WEEK * NANOS_PER_SEC)
    }

    pub fn sow(&self) -> f64 {
        self.nanos.rem_euclid(SEC_PER_WEEK * NANOS_PER_SEC) as f64 / NANOS_PER_SEC as f64
    }

    /// `self - other` in seconds
    pub fn diff_seconds(&self, other: &NavTime) -> f64 {
        (self.nanos as i128 - other.nanos as i128) as f64 / NANOS_PER_SEC as f64
    }

    /// Shift by a number of seconds, saturating at the sentinels
    pub fn add_seconds(self, seconds: f64) -> Self {
        if self.is_sentinel() {
            return self;
        }
        Self {
            nanos: self.nanos.saturating_add(seconds_to_nanos(seconds)),
            system: self.system,
        }
    }

    /// Convert to another time system at whole-second precision
    ///
    /// Conversion goes through UTC using the built-in leap second table.
    /// Good enough for availability checks, not for point lookups.
    pub fn to_system_coarse(&self, target: TimeSystem) -> NavTime {
        if self.is_sentinel()
            || self.system == target
            || self.system == TimeSystem::Any
            || target == TimeSystem::Any
        {
            return self.with_system(target);
        }
        let secs = self.nanos.div_euclid(NANOS_PER_SEC);
        let utc = to_utc_seconds(self.system, secs);
        NavTime {
            nanos: from_utc_seconds(target, utc).saturating_mul(NANOS_PER_SEC),
            system: target,
        }
    }

    /// Calendar representation in UTC, `None` for the sentinels
    pub fn to_utc_datetime(&self) -> Option<DateTime<Utc>> {
        if self.is_sentinel() {
            return None;
        }
        let utc = self.to_system_coarse(TimeSystem::Utc);
        let secs = utc.nanos.div_euclid(NANOS_PER_SEC);
        let frac = self.nanos.rem_euclid(NANOS_PER_SEC) as u32;
        DateTime::from_timestamp(secs + GPS_EPOCH_UNIX, frac)
    }
}

fn seconds_to_nanos(seconds: f64) -> i64 {
    // `as` saturates on overflow and maps NaN to 0
    (seconds * NANOS_PER_SEC as f64).round() as i64
}

/// UTC second (counted from the GPS epoch) at which each leap count starts
fn leap_table_utc() -> impl Iterator<Item = (i64, i64)> {
    LEAP_SECONDS.iter().filter_map(|&(year, month, leap)| {
        let date = NaiveDate::from_ymd_opt(year, month, 1)?;
        let unix = date.and_hms_opt(0, 0, 0)?.and_utc().timestamp();
        Some((unix - GPS_EPOCH_UNIX, leap))
    })
}

fn leap_seconds_at_utc(utc: i64) -> i64 {
    leap_table_utc()
        .take_while(|(start, _)| *start <= utc)
        .last()
        .map(|(_, leap)| leap)
        .unwrap_or(0)
}

fn leap_seconds_at_gps(gps: i64) -> i64 {
    leap_table_utc()
        .take_while(|(start, leap)| start + leap <= gps)
        .last()
        .map(|(_, leap)| leap)
        .unwrap_or(0)
}

fn to_utc_seconds(system: TimeSystem, secs: i64) -> i64 {
    match system {
        TimeSystem::Gps | TimeSystem::Gal | TimeSystem::Qzs => secs - leap_seconds_at_gps(secs),
        TimeSystem::Bdt => {
            let gps = secs + BDT_GPS_OFFSET;
            gps - leap_seconds_at_gps(gps)
        }
        TimeSystem::Glo => secs - GLO_UTC_OFFSET,
        TimeSystem::Utc | TimeSystem::Any => secs,
    }
}

fn from_utc_seconds(system: TimeSystem, utc: i64) -> i64 {
    match system {
        TimeSystem::Gps | TimeSystem::Gal | TimeSystem::Qzs => utc + leap_seconds_at_utc(utc),
        TimeSystem::Bdt => utc + leap_seconds_at_utc(utc) - BDT_GPS_OFFSET,
        TimeSystem::Glo => utc + GLO_UTC_OFFSET,
        TimeSystem::Utc | TimeSystem::Any => utc,
    }
}

impl PartialEq for NavTime {
    fn eq(&self, other: &Self) -> bool {
        self.nanos == other.nanos
    }
}

impl Eq for NavTime {}

impl PartialOrd for NavTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NavTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.nanos.cmp(&other.nanos)
    }
}

impl Hash for NavTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.nanos.hash(state);
    }
}

impl fmt::Display for NavTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.nanos {
            i64::MIN => write!(f, "BEGINNING_OF_TIME"),
            i64::MAX => write!(f, "END_OF_TIME"),
            _ => write!(f, "{:04} {:10.3} {}", self.week(), self.sow(), self.system),
        }
    }
}
