/*
 *  display/drivers/headless.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Driver that accepts frames and discards them
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

use embedded_graphics::pixelcolor::Rgb888;
use log::{info, trace};

use crate::config::DisplayConfig;
use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};

/// For running the loop on a host with no panel attached.
#[derive(Debug)]
pub struct HeadlessDriver {
    capabilities: DisplayCapabilities,
    frames: u64,
}

impl HeadlessDriver {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            capabilities: DisplayCapabilities {
                width: config.width,
                height: config.height,
                bit_depth: config.bit_depth,
                color_order: config.color_order,
                supports_brightness: false,
            },
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl DisplayDriver for HeadlessDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        info!("Headless display {}x{}", self.capabilities.width, self.capabilities.height);
        Ok(())
    }

    fn set_brightness(&mut self, _value: u8) -> Result<(), DisplayError> {
        Ok(())
    }

    fn write_frame(&mut self, frame: &[Rgb888]) -> Result<(), DisplayError> {
        let expected = self.capabilities.pixel_count();
        if frame.len() != expected {
            return Err(DisplayError::BufferSizeMismatch { expected, actual: frame.len() });
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.frames += 1;
        trace!("headless frame {}", self.frames);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}
