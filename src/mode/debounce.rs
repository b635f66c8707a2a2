/*
 *  mode/debounce.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Polled switch debouncer over embedded-hal input pins
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

use embedded_hal::digital::InputPin;
use std::time::{Duration, Instant};

/// Tracks a raw and a stable level. A raw change restarts the settle
/// timer; once the raw level has held for `interval` it becomes the
/// stable level and `fell`/`rose` report the edge for that one update.
pub struct Debouncer<P: InputPin> {
    pin: P,
    interval: Duration,
    raw: bool,
    stable: bool,
    raw_since: Instant,
    changed: bool,
}

impl<P: InputPin> Debouncer<P> {
    pub fn new(mut pin: P, interval: Duration, now: Instant) -> Result<Self, P::Error> {
        let level = pin.is_high()?;
        Ok(Self {
            pin,
            interval,
            raw: level,
            stable: level,
            raw_since: now,
            changed: false,
        })
    }

    pub fn update(&mut self, now: Instant) -> Result<(), P::Error> {
        self.changed = false;
        let level = self.pin.is_high()?;

        if level != self.raw {
            self.raw = level;
            self.raw_since = now;
        } else if self.raw != self.stable
            && now.saturating_duration_since(self.raw_since) >= self.interval
        {
            self.stable = self.raw;
            self.changed = true;
        }
        Ok(())
    }

    pub fn value(&self) -> bool {
        self.stable
    }

    /// High to low on the last update. Buttons are wired active low.
    pub fn fell(&self) -> bool {
        self.changed && !self.stable
    }

    pub fn rose(&self) -> bool {
        self.changed && self.stable
    }
}
