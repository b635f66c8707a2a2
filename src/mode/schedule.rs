/*
 *  mode/schedule.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Time of day mode switching
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

use chrono::{NaiveTime, Timelike};

use super::Mode;
use crate::clock::TimePoint;
use crate::config::ScheduleConfig;

const DAY_SECS: i64 = 24 * 60 * 60;

/// Gaps wider than this are clock steps, not elapsed time.
const MAX_CATCH_UP_SECS: i64 = 5 * 60;

/// Fixed HH:MM switch points.
///
/// Each call to [`ModeSchedule::due`] covers the wall time since the
/// previous call, so a switch fires once even when its `:00` second is
/// never sampled. A manual change sticks until the next switch point.
#[derive(Debug, Clone, Default)]
pub struct ModeSchedule {
    switches: Vec<(NaiveTime, Mode)>,
    last: Option<i64>,
}

impl ModeSchedule {
    pub fn from_config(cfg: &ScheduleConfig) -> Result<Self, String> {
        let mut switches = Vec::new();
        for (raw, mode) in [(&cfg.on, Mode::On), (&cfg.dark, Mode::Dark), (&cfg.off, Mode::Off)] {
            if let Some(raw) = raw {
                switches.push((parse_hhmm(raw)?, mode));
            }
        }
        switches.sort_by_key(|(at, _)| *at);
        Ok(Self { switches, last: None })
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }

    /// Mode of the latest switch point in `(last, now]`.
    ///
    /// The first call covers the current minute up to `now`. Backward steps
    /// and large forward jumps only move the baseline.
    pub fn due(&mut self, now: &TimePoint) -> Option<Mode> {
        let current = i64::from(now.hour * 3600 + now.minute * 60 + now.second);
        let last = self
            .last
            .replace(current)
            .unwrap_or_else(|| (current - i64::from(now.second) - 1).rem_euclid(DAY_SECS));

        let span = (current - last).rem_euclid(DAY_SECS);
        if span == 0 || span > MAX_CATCH_UP_SECS {
            return None;
        }

        self.switches
            .iter()
            .map(|(at, mode)| ((i64::from(at.num_seconds_from_midnight()) - last).rem_euclid(DAY_SECS), *mode))
            .filter(|(offset, _)| (1..=span).contains(offset))
            .max_by_key(|(offset, _)| *offset)
            .map(|(_, mode)| mode)
    }
}

pub fn parse_hhmm(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| format!("invalid HH:MM time '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> TimePoint {
        TimePoint::from_naive(NaiveDate::from_ymd_opt(2023, 7, 14).unwrap().and_hms_opt(h, m, s).unwrap())
    }

    fn schedule() -> ModeSchedule {
        ModeSchedule::from_config(&ScheduleConfig {
            on: Some("09:00".into()),
            dark: Some("21:00".into()),
            off: Some("23:00".into()),
        })
        .unwrap()
    }

    #[test]
    fn test_switch_on_exact_second() {
        let mut s = schedule();
        assert_eq!(s.due(&at(8, 59, 59)), None);
        assert_eq!(s.due(&at(9, 0, 0)), Some(Mode::On));
        assert_eq!(s.due(&at(9, 0, 1)), None);
        assert_eq!(s.due(&at(9, 1, 0)), None);
    }

    #[test]
    fn test_skipped_second_still_switches() {
        let mut s = schedule();
        assert_eq!(s.due(&at(20, 59, 59)), None);
        assert_eq!(s.due(&at(21, 0, 1)), Some(Mode::Dark));
        assert_eq!(s.due(&at(21, 0, 2)), None);
    }

    #[test]
    fn test_first_call_covers_current_minute() {
        let mut s = schedule();
        assert_eq!(s.due(&at(23, 0, 5)), Some(Mode::Off));

        let mut s = schedule();
        assert_eq!(s.due(&at(23, 1, 0)), None);
    }

    #[test]
    fn test_latest_switch_wins() {
        let mut s = ModeSchedule::from_config(&ScheduleConfig {
            on: Some("12:01".into()),
            dark: Some("12:02".into()),
            off: None,
        })
        .unwrap();
        assert_eq!(s.due(&at(12, 0, 30)), None);
        assert_eq!(s.due(&at(12, 2, 30)), Some(Mode::Dark));
    }

    #[test]
    fn test_midnight_wrap() {
        let mut s = ModeSchedule::from_config(&ScheduleConfig { on: Some("00:00".into()), dark: None, off: None }).unwrap();
        assert_eq!(s.due(&at(23, 59, 59)), None);
        assert_eq!(s.due(&at(0, 0, 1)), Some(Mode::On));
    }

    #[test]
    fn test_clock_steps_only_rebaseline() {
        let mut s = schedule();
        assert_eq!(s.due(&at(9, 0, 30)), Some(Mode::On));
        // backwards over the switch does not replay it
        assert_eq!(s.due(&at(8, 59, 50)), None);
        assert_eq!(s.due(&at(9, 0, 0)), Some(Mode::On));
        // a sync from 00:00 to mid afternoon is not a day of elapsed switches
        assert_eq!(s.due(&at(15, 30, 0)), None);
        assert_eq!(s.due(&at(15, 30, 1)), None);
    }

    #[test]
    fn test_partial_and_bad_config() {
        let mut s = ModeSchedule::from_config(&ScheduleConfig { on: None, dark: None, off: Some("07:05".into()) }).unwrap();
        assert_eq!(s.due(&at(7, 4, 59)), None);
        assert_eq!(s.due(&at(7, 5, 0)), Some(Mode::Off));

        assert!(ModeSchedule::from_config(&ScheduleConfig { on: Some("25:00".into()), dark: None, off: None }).is_err());
        assert!(ModeSchedule::from_config(&ScheduleConfig::default()).unwrap().is_empty());
    }
}
