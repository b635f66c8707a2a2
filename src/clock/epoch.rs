/*
 *  clock/epoch.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Second, minute and hour boundary detection for the control loop
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

//! Boundary crossings are measured on the monotonic clock and classified
//! with the wall clock. A crossing re-baselines to the sampled instant, so
//! the loop must tick faster than once a second; even then a wall `:00`
//! can occasionally be stepped over and its minute flag lost.

use std::time::{Duration, Instant};

use super::TimePoint;

const SECOND: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Boundaries {
    pub hour: bool,
    pub minute: bool,
    pub second: bool,
}

impl Boundaries {
    pub const ALL: Boundaries = Boundaries { hour: true, minute: true, second: true };

    pub fn any(&self) -> bool {
        self.hour || self.minute || self.second
    }
}

/// Pure boundary step.
///
/// Returns the tick to carry forward and the boundaries crossed since
/// `previous`. With no previous tick every boundary is reported.
pub fn advance(previous: Option<Instant>, now: Instant, wall: &TimePoint) -> (Instant, Boundaries) {
    let Some(last) = previous else {
        return (now, Boundaries::ALL);
    };

    // Instant cannot run backwards, but a stale tick handed in can sit ahead
    let elapsed = now.checked_duration_since(last).unwrap_or(Duration::ZERO);
    if elapsed < SECOND {
        return (last, Boundaries::default());
    }

    let minute = wall.second == 0;
    let hour = minute && wall.minute == 0;
    (now, Boundaries { hour, minute, second: true })
}

/// Owns the carried tick between loop iterations.
#[derive(Debug, Default)]
pub struct EpochTracker {
    last_tick: Option<Instant>,
}

impl EpochTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.last_tick.is_some()
    }

    pub fn advance(&mut self, now: Instant, wall: &TimePoint) -> Boundaries {
        let (tick, crossed) = advance(self.last_tick, now, wall);
        self.last_tick = Some(tick);
        crossed
    }
}
