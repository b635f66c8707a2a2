/*
 *  display/color.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Palette roles, rate banding and panel pixel packing
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

use crate::config::{ColorOrder, PaletteConfig};

/// 0xRRGGBB to a pixel colour
pub fn rgb(hex: u32) -> Rgb888 {
    Rgb888::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Multiply every channel by `factor`, clamped to 0.0..=1.0
pub fn scale(color: Rgb888, factor: f32) -> Rgb888 {
    let f = factor.clamp(0.0, 1.0);
    let ch = |v: u8| (f32::from(v) * f).round() as u8;
    Rgb888::new(ch(color.r()), ch(color.g()), ch(color.b()))
}

/// Cheap/normal/expensive banding of a unit rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBands {
    pub low: f64,
    pub high: f64,
}

impl RateBands {
    /// `low` strictly below the low band, `high` strictly above the high band
    pub fn rate_to_color(&self, rate: f64, low: Rgb888, high: Rgb888, default: Rgb888) -> Rgb888 {
        if rate < self.low {
            low
        } else if rate > self.high {
            high
        } else {
            default
        }
    }
}

/// Colour for each role, already scaled by global brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub off: Rgb888,
    pub dimmed: Rgb888,
    pub low: Rgb888,
    pub high: Rgb888,
    pub label: Rgb888,
    pub label_extreme: Rgb888,
    pub calendar: Rgb888,
    pub clock: Rgb888,
}

impl Palette {
    pub fn from_config(cfg: &PaletteConfig, brightness: f32) -> Self {
        let c = |hex: u32| scale(rgb(hex), brightness);
        Self {
            off: Rgb888::BLACK,
            dimmed: c(cfg.dimmed),
            low: c(cfg.low),
            high: c(cfg.high),
            label: c(cfg.label),
            label_extreme: c(cfg.label_extreme),
            calendar: c(cfg.calendar),
            clock: c(cfg.clock),
        }
    }
}

/// First configured colour that scales and quantises to black, by role name.
pub fn vanishing_role(cfg: &PaletteConfig, brightness: f32, bit_depth: u8) -> Option<&'static str> {
    [
        ("dimmed", cfg.dimmed),
        ("low", cfg.low),
        ("high", cfg.high),
        ("label", cfg.label),
        ("label_extreme", cfg.label_extreme),
        ("calendar", cfg.calendar),
        ("clock", cfg.clock),
    ]
    .into_iter()
    .filter(|(_, hex)| *hex != 0)
    .find(|(_, hex)| to_panel_bytes(scale(rgb(*hex), brightness), ColorOrder::Rgb, bit_depth) == [0; 3])
    .map(|(role, _)| role)
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_config(&PaletteConfig::default(), 1.0)
    }
}

/// Keep the top `bit_depth` bits of a channel.
pub fn quantize(value: u8, bit_depth: u8) -> u8 {
    let depth = bit_depth.clamp(1, 8);
    value & ((0xFFu16 << (8 - depth)) as u8)
}

/// Channel bytes in the order the panel wires them.
pub fn to_panel_bytes(color: Rgb888, order: ColorOrder, bit_depth: u8) -> [u8; 3] {
    let (r, g, b) = (
        quantize(color.r(), bit_depth),
        quantize(color.g(), bit_depth),
        quantize(color.b(), bit_depth),
    );
    match order {
        ColorOrder::Rgb => [r, g, b],
        ColorOrder::Rbg => [r, b, g],
        ColorOrder::Grb => [g, r, b],
        ColorOrder::Gbr => [g, b, r],
        ColorOrder::Brg => [b, r, g],
        ColorOrder::Bgr => [b, g, r],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_conversion() {
        assert_eq!(rgb(0x330033), Rgb888::new(0x33, 0x00, 0x33));
        assert_eq!(rgb(0), Rgb888::BLACK);
    }

    #[test]
    fn test_scale() {
        assert_eq!(scale(Rgb888::new(200, 100, 0), 0.5), Rgb888::new(100, 50, 0));
        assert_eq!(scale(Rgb888::new(200, 100, 0), 2.0), Rgb888::new(200, 100, 0));
        assert_eq!(scale(Rgb888::WHITE, 0.0), Rgb888::BLACK);
    }

    #[test]
    fn test_rate_bands_are_exclusive() {
        let bands = RateBands { low: 10.0, high: 30.0 };
        let (lo, hi, mid) = (Rgb888::GREEN, Rgb888::RED, Rgb888::BLUE);
        assert_eq!(bands.rate_to_color(9.99, lo, hi, mid), lo);
        assert_eq!(bands.rate_to_color(10.0, lo, hi, mid), mid);
        assert_eq!(bands.rate_to_color(30.0, lo, hi, mid), mid);
        assert_eq!(bands.rate_to_color(30.01, lo, hi, mid), hi);
        assert_eq!(bands.rate_to_color(-4.0, lo, hi, mid), lo);
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(0xFF, 3), 0xE0);
        assert_eq!(quantize(0x33, 3), 0x20);
        assert_eq!(quantize(0x33, 8), 0x33);
        assert_eq!(quantize(0x80, 1), 0x80);
        assert_eq!(quantize(0x7F, 1), 0x00);
    }

    #[test]
    fn test_panel_byte_order() {
        let c = Rgb888::new(0xE0, 0x40, 0x20);
        assert_eq!(to_panel_bytes(c, ColorOrder::Rgb, 8), [0xE0, 0x40, 0x20]);
        assert_eq!(to_panel_bytes(c, ColorOrder::Grb, 8), [0x40, 0xE0, 0x20]);
        assert_eq!(to_panel_bytes(c, ColorOrder::Bgr, 8), [0x20, 0x40, 0xE0]);
    }

    #[test]
    fn test_dim_palette_vanishes_at_low_depth() {
        let cfg = PaletteConfig::default();
        assert_eq!(vanishing_role(&cfg, 1.0, 3), None);
        assert_eq!(vanishing_role(&cfg, 0.7, 3), None);
        assert_eq!(vanishing_role(&cfg, 0.5, 3), Some("dimmed"));
        assert_eq!(vanishing_role(&cfg, 0.5, 4), None);

        let bright = PaletteConfig { dimmed: 0, low: 0x00ff00, ..cfg };
        assert_eq!(vanishing_role(&bright, 0.5, 3), Some("high"));
    }

    #[test]
    fn test_default_palette_matches_config() {
        let p = Palette::default();
        assert_eq!(p.low, Rgb888::new(0, 0x33, 0));
        assert_eq!(p.high, Rgb888::new(0x33, 0, 0));
        assert_eq!(p.dimmed, Rgb888::new(0, 0, 0x33));
    }
}
