/*
 *  clock/mod.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Wall clock readings and the software real-time clock
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

pub mod epoch;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, TimeDelta, Timelike, Weekday};
use std::fmt;
use std::time::Instant;

use crate::error::ParseError;

pub use epoch::{Boundaries, EpochTracker};

/// Broken-down wall time.
///
/// `weekday` and `is_dst` are `None` when the source did not carry them
/// (the time service does not), and must not be relied on in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePoint {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub weekday: Option<Weekday>,
    pub is_dst: Option<bool>,
}

impl TimePoint {
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
            weekday: Some(dt.weekday()),
            is_dst: None,
        }
    }

    /// None if the fields do not describe a real calendar instant.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?
            .and_hms_opt(self.hour, self.minute, self.second)
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Parse `YYYY-MM-DDTHH:MM:SS[.fraction][offset...]`.
///
/// Fractional seconds and whatever trails them (UTC offset, zone name)
/// are dropped. Weekday and DST come back unknown.
pub fn parse_timestamp(raw: &str) -> Result<TimePoint, ParseError> {
    let bad = || ParseError::Timestamp(raw.to_string());

    let (date, time) = raw
        .trim()
        .split_once(|c| c == 'T' || c == ' ')
        .ok_or_else(bad)?;

    let mut ymd = date.splitn(3, '-');
    let year: i32 = number(ymd.next()).ok_or_else(bad)?;
    let month: u32 = number(ymd.next()).ok_or_else(bad)?;
    let day: u32 = number(ymd.next()).ok_or_else(bad)?;

    let mut hms = time.splitn(3, ':');
    let hour: u32 = number(hms.next()).ok_or_else(bad)?;
    let minute: u32 = number(hms.next()).ok_or_else(bad)?;
    let seconds = hms.next().ok_or_else(bad)?;
    let digits = seconds
        .find(|c: char| !c.is_ascii_digit())
        .map_or(seconds, |end| &seconds[..end]);
    let second: u32 = number(Some(digits)).ok_or_else(bad)?;

    let parsed = TimePoint {
        year,
        month,
        day,
        hour,
        minute,
        second,
        weekday: None,
        is_dst: None,
    };
    parsed.to_naive().ok_or_else(bad)?;
    Ok(parsed)
}

fn number<T: std::str::FromStr>(part: Option<&str>) -> Option<T> {
    part.filter(|s| !s.is_empty()).and_then(|s| s.parse().ok())
}

/// Source of monotonic ticks and settable wall time.
pub trait Clock {
    fn monotonic(&self) -> Instant;
    fn now(&self) -> TimePoint;
    fn set(&mut self, wall: NaiveDateTime);
}

/// Software RTC: wall time anchored to a monotonic instant once synced,
/// falling back to the host's local time before the first sync.
#[derive(Debug, Default)]
pub struct SoftRtc {
    anchor: Option<(NaiveDateTime, Instant)>,
}

impl SoftRtc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_synced(&self) -> bool {
        self.anchor.is_some()
    }
}

impl Clock for SoftRtc {
    fn monotonic(&self) -> Instant {
        Instant::now()
    }

    fn now(&self) -> TimePoint {
        let wall = match self.anchor {
            Some((base, at)) => {
                base + TimeDelta::from_std(at.elapsed()).unwrap_or(TimeDelta::zero())
            }
            None => Local::now().naive_local(),
        };
        TimePoint::from_naive(wall)
    }

    fn set(&mut self, wall: NaiveDateTime) {
        self.anchor = Some((wall, Instant::now()));
    }
}
