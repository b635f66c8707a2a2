/*
 *  mode/mod.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display modes and the cyclic mode selector
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

pub mod buttons;
pub mod debounce;
pub mod schedule;

#[cfg(feature = "gpio")]
pub mod gpio;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use buttons::{Buttons, ModeButtons, NoButtons};
pub use debounce::Debouncer;
pub use schedule::ModeSchedule;

/// What the board is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Full layout with rate coloured outlines
    On,
    /// Compact, outline-free layout for night time
    Dark,
    /// Panel blanked
    Off,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::On => "on",
            Mode::Dark => "dark",
            Mode::Off => "off",
        };
        f.write_str(name)
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(Mode::On),
            "dark" => Ok(Mode::Dark),
            "off" => Ok(Mode::Off),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

pub fn default_modes() -> Vec<Mode> {
    vec![Mode::On, Mode::Off]
}

/// Cursor over an ordered mode list. Advancing past the end wraps to the start.
#[derive(Debug, Clone)]
pub struct ModeController {
    modes: Vec<Mode>,
    index: usize,
}

impl ModeController {
    /// An empty list falls back to on/off.
    pub fn new(modes: Vec<Mode>) -> Self {
        let modes = if modes.is_empty() { default_modes() } else { modes };
        Self { modes, index: 0 }
    }

    pub fn current(&self) -> Mode {
        self.modes[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    pub fn advance(&mut self) -> Mode {
        self.index = (self.index + 1) % self.modes.len();
        log::info!("Mode switch: {} ({})", self.current(), self.index);
        self.current()
    }

    /// Jump to `mode` if it is in the list. Returns whether the mode changed.
    pub fn select(&mut self, mode: Mode) -> bool {
        match self.modes.iter().position(|m| *m == mode) {
            Some(idx) if idx != self.index => {
                log::info!("Mode select: {} -> {}", self.current(), mode);
                self.index = idx;
                true
            }
            Some(_) => false,
            None => {
                log::debug!("Mode {} not in {:?}, ignored", mode, self.modes);
                false
            }
        }
    }
}
