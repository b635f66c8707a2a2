/*
 *  mode/buttons.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  The pair of mode buttons polled once per tick
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
use log::warn;
use std::time::{Duration, Instant};

use super::debounce::Debouncer;

/// Polled input that may request a mode advance.
pub trait Buttons {
    /// True when a press was recognised since the last poll.
    fn poll(&mut self, now: Instant) -> bool;
}

/// Boards without buttons.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoButtons;

impl Buttons for NoButtons {
    fn poll(&mut self, _now: Instant) -> bool {
        false
    }
}

/// Down and up buttons, either one advances the mode.
pub struct ModeButtons<D: InputPin, U: InputPin> {
    down: Debouncer<D>,
    up: Debouncer<U>,
}

impl<D: InputPin, U: InputPin> ModeButtons<D, U> {
    pub fn new(down: D, up: U, interval: Duration) -> Result<Self, String> {
        let now = Instant::now();
        let down = Debouncer::new(down, interval, now).map_err(|e| format!("button down: {:?}", e))?;
        let up = Debouncer::new(up, interval, now).map_err(|e| format!("button up: {:?}", e))?;
        Ok(Self { down, up })
    }
}

impl<D: InputPin, U: InputPin> Buttons for ModeButtons<D, U> {
    fn poll(&mut self, now: Instant) -> bool {
        // a pin read error only costs this poll
        if let Err(e) = self.down.update(now) {
            warn!("Button down read failed: {:?}", e);
        }
        if let Err(e) = self.up.update(now) {
            warn!("Button up read failed: {:?}", e);
        }
        self.down.fell() || self.up.fell()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::debounce::tests::FakePin;
    use crate::mode::{Mode, ModeController};

    #[test]
    fn test_either_button_advances() {
        let down = FakePin::high();
        let up = FakePin::high();
        let mut buttons = ModeButtons::new(down.clone(), up.clone(), Duration::from_millis(10)).unwrap();
        let mut modes = ModeController::new(vec![Mode::On, Mode::Dark, Mode::Off]);
        let t0 = Instant::now();
        let tick = Duration::from_millis(100);

        let mut step = |n: u32, modes: &mut ModeController| {
            if buttons.poll(t0 + tick * n) {
                modes.advance();
            }
        };

        down.set(false);
        for n in 1..5 {
            step(n, &mut modes);
        }
        down.set(true);
        up.set(false);
        for n in 5..9 {
            step(n, &mut modes);
        }
        up.set(true);
        for n in 9..12 {
            step(n, &mut modes);
        }

        assert_eq!(modes.current(), Mode::Off);
    }

    #[test]
    fn test_no_buttons_never_fire() {
        assert!(!NoButtons.poll(Instant::now()));
    }
}
