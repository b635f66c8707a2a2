/*
 *  display/traits.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Driver and renderer seams
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

use crate::clock::TimePoint;
use crate::config::ColorOrder;
use crate::display::error::DisplayError;
use crate::state::DisplayState;

/// Panel geometry and pixel format
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Bits kept per colour channel
    pub bit_depth: u8,

    /// Channel order the panel expects
    pub color_order: ColorOrder,

    /// Whether the display supports brightness control
    pub supports_brightness: bool,
}

impl DisplayCapabilities {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Minimal hardware abstraction - all display drivers must implement this trait
///
/// Drivers receive whole RGB frames; composition happens in the renderer.
pub trait DisplayDriver: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Bring the panel or export target up
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Set display brightness (0-255), 0 blanks the panel
    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError>;

    /// Stage one frame, row major, `width * height` pixels
    fn write_frame(&mut self, frame: &[Rgb888]) -> Result<(), DisplayError>;

    /// Push the staged frame out
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Clear the display to blank/off state
    fn clear(&mut self) -> Result<(), DisplayError>;
}

pub type BoxedDriver = Box<dyn DisplayDriver>;

/// Turns loop state into pixels. Called once per second boundary.
pub trait Renderer {
    fn draw(&mut self, frame: u64, now: &TimePoint, state: &DisplayState) -> Result<(), DisplayError>;

    /// Blank the panel on shutdown
    fn blank(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}
