/*
 *  display/drivers/mock.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock display driver for testing without hardware
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

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

use crate::config::ColorOrder;
use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};

use std::sync::{Arc, Mutex};

/// Records every call so tests can look at what the renderer pushed.
#[derive(Debug, Clone)]
pub struct MockDriver {
    capabilities: DisplayCapabilities,
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    pub init_count: usize,
    pub flush_count: usize,
    pub clear_count: usize,
    pub last_brightness: Option<u8>,
    pub frames_written: usize,
    /// Last frame staged by write_frame
    pub last_frame: Vec<Rgb888>,
    pub simulate_flush_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockDriver {
    pub fn new_with_size(width: u32, height: u32) -> Self {
        Self {
            capabilities: DisplayCapabilities {
                width,
                height,
                bit_depth: 8,
                color_order: ColorOrder::Rgb,
                supports_brightness: true,
            },
            state: Arc::new(Mutex::new(MockDriverState::default())),
        }
    }

    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    /// Pixel from the last staged frame
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x >= self.capabilities.width || y >= self.capabilities.height {
            return None;
        }
        let idx = (y * self.capabilities.width + x) as usize;
        self.state.lock().unwrap().last_frame.get(idx).copied()
    }

    pub fn count_lit_pixels(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .last_frame
            .iter()
            .filter(|p| **p != Rgb888::BLACK)
            .count()
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        if state.simulate_init_failure {
            return Err(DisplayError::Other("Simulated init failure".to_string()));
        }
        state.init_count += 1;
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        self.state.lock().unwrap().last_brightness = Some(value);
        Ok(())
    }

    fn write_frame(&mut self, frame: &[Rgb888]) -> Result<(), DisplayError> {
        let expected = self.capabilities.pixel_count();
        if frame.len() != expected {
            return Err(DisplayError::BufferSizeMismatch { expected, actual: frame.len() });
        }
        let mut state = self.state.lock().unwrap();
        state.frames_written += 1;
        state.last_frame = frame.to_vec();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        if state.simulate_flush_failure {
            return Err(DisplayError::Other("Simulated flush failure".to_string()));
        }
        state.flush_count += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        {
            let mut state = self.state.lock().unwrap();
            state.clear_count += 1;
            state.last_frame = vec![Rgb888::BLACK; self.capabilities.pixel_count()];
        } // Release lock before calling flush
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_driver_init() {
        let mut driver = MockDriver::new_with_size(64, 32);
        let state = driver.state();
        assert_eq!(state.lock().unwrap().init_count, 0);
        driver.init().unwrap();
        assert_eq!(state.lock().unwrap().init_count, 1);
    }

    #[test]
    fn test_mock_driver_frame_and_clear() {
        let mut driver = MockDriver::new_with_size(4, 2);
        let mut frame = vec![Rgb888::BLACK; 8];
        frame[5] = Rgb888::RED;
        driver.write_frame(&frame).unwrap();
        assert_eq!(driver.pixel(1, 1), Some(Rgb888::RED));
        assert_eq!(driver.count_lit_pixels(), 1);

        driver.clear().unwrap();
        assert_eq!(driver.count_lit_pixels(), 0);
        assert_eq!(driver.state().lock().unwrap().flush_count, 1);
    }

    #[test]
    fn test_mock_driver_simulated_failure() {
        let mut driver = MockDriver::new_with_size(4, 2);
        driver.state().lock().unwrap().simulate_flush_failure = true;
        assert!(driver.flush().is_err());
    }
}
