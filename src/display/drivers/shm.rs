/*
 *  display/drivers/shm.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame export through a shared memory file for the panel daemon
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

//! Region layout, little endian:
//!
//! | offset | size | field                          |
//! |--------|------|--------------------------------|
//! | 0      | 4    | magic `AGBD`                   |
//! | 4      | 2    | width                          |
//! | 6      | 2    | height                         |
//! | 8      | 1    | bit depth                      |
//! | 9      | 1    | brightness                     |
//! | 10     | 1    | channel order                  |
//! | 11     | 1    | reserved                       |
//! | 12     | 4    | sequence, bumped per flush     |
//! | 16     | w*h*3| pixels, row major              |

use embedded_graphics::pixelcolor::Rgb888;
use log::{debug, info};
use memmap2::{MmapMut, MmapOptions};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::config::{ColorOrder, DisplayConfig};
use crate::display::color::{scale, to_panel_bytes};
use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};

pub const MAGIC: &[u8; 4] = b"AGBD";
pub const HEADER_LEN: usize = 16;

pub struct ShmDriver {
    capabilities: DisplayCapabilities,
    path: PathBuf,
    map: Option<MmapMut>,
    staged: Vec<u8>,
    brightness: u8,
    sequence: u32,
}

impl ShmDriver {
    pub fn new(config: &DisplayConfig) -> Self {
        let capabilities = DisplayCapabilities {
            width: config.width,
            height: config.height,
            bit_depth: config.bit_depth,
            color_order: config.color_order,
            supports_brightness: true,
        };
        let staged = vec![0; capabilities.pixel_count() * 3];
        Self {
            capabilities,
            path: config.shm_path.clone(),
            map: None,
            staged,
            brightness: 255,
            sequence: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn region_len(&self) -> usize {
        HEADER_LEN + self.staged.len()
    }

    fn header(&self) -> [u8; HEADER_LEN] {
        let caps = &self.capabilities;
        let mut h = [0u8; HEADER_LEN];
        h[0..4].copy_from_slice(MAGIC);
        h[4..6].copy_from_slice(&(caps.width as u16).to_le_bytes());
        h[6..8].copy_from_slice(&(caps.height as u16).to_le_bytes());
        h[8] = caps.bit_depth;
        h[9] = self.brightness;
        h[10] = order_code(caps.color_order);
        h[12..16].copy_from_slice(&self.sequence.to_le_bytes());
        h
    }
}

fn order_code(order: ColorOrder) -> u8 {
    match order {
        ColorOrder::Rgb => 0,
        ColorOrder::Rbg => 1,
        ColorOrder::Grb => 2,
        ColorOrder::Gbr => 3,
        ColorOrder::Brg => 4,
        ColorOrder::Bgr => 5,
    }
}

impl DisplayDriver for ShmDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        if self.capabilities.width > u32::from(u16::MAX) || self.capabilities.height > u32::from(u16::MAX) {
            return Err(DisplayError::InvalidConfiguration("panel too large for frame header".into()));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| DisplayError::InitializationFailed(format!("{}: {}", self.path.display(), e)))?;
        let len = self.region_len();
        file.set_len(len as u64)?;

        // SAFETY: the file is sized above and only this process writes it
        let mut map = unsafe { MmapOptions::new().len(len).map_mut(&file)? };
        map.fill(0);
        self.map = Some(map);

        info!(
            "Frame export: {} ({}x{}, {} bit)",
            self.path.display(),
            self.capabilities.width,
            self.capabilities.height,
            self.capabilities.bit_depth
        );
        self.flush()
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        if value != self.brightness {
            debug!("Brightness {} -> {}", self.brightness, value);
        }
        self.brightness = value;
        Ok(())
    }

    fn write_frame(&mut self, frame: &[Rgb888]) -> Result<(), DisplayError> {
        let expected = self.capabilities.pixel_count();
        if frame.len() != expected {
            return Err(DisplayError::BufferSizeMismatch { expected, actual: frame.len() });
        }

        let level = f32::from(self.brightness) / 255.0;
        let (order, depth) = (self.capabilities.color_order, self.capabilities.bit_depth);
        for (dst, px) in self.staged.chunks_exact_mut(3).zip(frame) {
            dst.copy_from_slice(&to_panel_bytes(scale(*px, level), order, depth));
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.sequence = self.sequence.wrapping_add(1);
        let header = self.header();
        let map = self.map.as_mut().ok_or(DisplayError::NotInitialized)?;

        map[HEADER_LEN..].copy_from_slice(&self.staged);
        // sequence lands last so a reader never sees a new number on old pixels
        map[..12].copy_from_slice(&header[..12]);
        map[12..HEADER_LEN].copy_from_slice(&header[12..]);
        map.flush()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.staged.fill(0);
        self.flush()
    }
}
