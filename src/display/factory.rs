/*
 *  display/factory.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display driver factory
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

use log::info;

use crate::config::{DisplayConfig, DriverKind};
use crate::display::drivers::headless::HeadlessDriver;
use crate::display::drivers::shm::ShmDriver;
use crate::display::error::DisplayError;
use crate::display::traits::BoxedDriver;

/// Build the driver named in the configuration. The driver is not
/// initialised; callers run `init()` once they are ready to draw.
pub fn create_driver(config: &DisplayConfig) -> Result<BoxedDriver, DisplayError> {
    if config.width == 0 || config.height == 0 {
        return Err(DisplayError::InvalidConfiguration(format!(
            "panel size {}x{}",
            config.width, config.height
        )));
    }
    if !(1..=8).contains(&config.bit_depth) {
        return Err(DisplayError::InvalidConfiguration(format!(
            "bit depth {} not in 1-8",
            config.bit_depth
        )));
    }

    info!("Display driver: {:?} {}x{}", config.driver, config.width, config.height);
    match config.driver {
        DriverKind::Shm => Ok(Box::new(ShmDriver::new(config))),
        DriverKind::Headless => Ok(Box::new(HeadlessDriver::new(config))),
    }
}
