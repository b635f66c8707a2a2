/*
 *  state.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Loop owned state: what the panel shows and how often we failed
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

use chrono::NaiveDateTime;
use log::error;
use std::fmt;

use crate::error::AppError;
use crate::mode::Mode;
use crate::tariff::{RatePoint, ISO_FORMAT};

/// Everything the renderer reads. Rates survive failed refreshes.
#[derive(Debug, Clone)]
pub struct DisplayState {
    pub mode: Mode,
    pub rates: Option<Vec<RatePoint>>,
    pub period_lowest: Option<NaiveDateTime>,
    pub frame: u64,
}

impl DisplayState {
    pub fn new(mode: Mode) -> Self {
        Self { mode, rates: None, period_lowest: None, frame: 0 }
    }

    pub fn current_rate(&self) -> Option<&RatePoint> {
        self.rates.as_deref().and_then(|r| r.first())
    }

    pub fn next_rate(&self) -> Option<&RatePoint> {
        self.rates.as_deref().and_then(|r| r.get(1))
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode={} frame={}", self.mode, self.frame)?;
        match &self.rates {
            Some(rates) => {
                write!(f, " rates=[")?;
                for (i, r) in rates.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {:.2}", r.valid_from.format(ISO_FORMAT), r.price)?;
                }
                write!(f, "]")?;
            }
            None => write!(f, " rates=none")?,
        }
        match self.period_lowest {
            Some(at) => write!(f, " lowest={}", at.format(ISO_FORMAT)),
            None => write!(f, " lowest=none"),
        }
    }
}

/// Monotonic failure count. Past the threshold the loop is done.
#[derive(Debug, Clone)]
pub struct ErrorCounter {
    count: u32,
    threshold: u32,
}

impl ErrorCounter {
    pub fn new(threshold: u32) -> Self {
        Self { count: 0, threshold }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn record(&mut self, what: &str, err: &dyn fmt::Display) {
        self.count = self.count.saturating_add(1);
        error!("{}: {} (errors {}/{})", what, err, self.count, self.threshold);
    }

    pub fn check(&self) -> Result<(), AppError> {
        if self.count > self.threshold {
            return Err(AppError::TooManyErrors { count: self.count, threshold: self.threshold });
        }
        Ok(())
    }
}
