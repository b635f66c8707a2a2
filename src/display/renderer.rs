/*
 *  display/renderer.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Board composition: clock, calendar and tariff fields into a frame
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

use arrayvec::ArrayString;
use chrono::{Datelike, Weekday};
use core::fmt::Write;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, RoundedRectangle};
use embedded_graphics::text::{Baseline, Text};
use log::{debug, trace};

use crate::clock::TimePoint;
use crate::config::Config;
use crate::display::color::{Palette, RateBands};
use crate::display::error::DisplayError;
use crate::display::field::{Field, FieldType, Slot};
use crate::display::layout_manager::LayoutManager;
use crate::display::page::PageLayout;
use crate::display::traits::{BoxedDriver, Renderer};
use crate::metrics::MachineMetrics;
use crate::mode::Mode;
use crate::state::DisplayState;
use crate::vframebuf::VarFrameBuf;

type Label = ArrayString<16>;

/// Draws the board page into an RGB frame and hands it to a driver.
pub struct MatrixRenderer {
    driver: BoxedDriver,
    frame_buf: VarFrameBuf<Rgb888>,
    page: PageLayout,
    palette: Palette,
    bands: RateBands,
    debug: bool,
    brightness: Option<u8>,
}

impl MatrixRenderer {
    pub fn new(driver: BoxedDriver, palette: Palette, bands: RateBands, debug: bool) -> Self {
        let (w, h) = driver.dimensions();
        let page = LayoutManager::new(w, h).create_board_page();
        Self {
            driver,
            frame_buf: VarFrameBuf::new(w, h, palette.off),
            page,
            palette,
            bands,
            debug,
            brightness: None,
        }
    }

    pub fn from_config(driver: BoxedDriver, cfg: &Config) -> Self {
        let palette = Palette::from_config(&cfg.display.palette, cfg.display.brightness);
        let bands = RateBands { low: cfg.octopus.rate_low, high: cfg.octopus.rate_high };
        Self::new(driver, palette, bands, cfg.debug)
    }

    pub fn frame(&self) -> &VarFrameBuf<Rgb888> {
        &self.frame_buf
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        if self.brightness != Some(level) {
            debug!("Panel brightness {}", level);
            self.driver.set_brightness(level)?;
            self.brightness = Some(level);
        }
        Ok(())
    }
}

impl Renderer for MatrixRenderer {
    fn draw(&mut self, frame: u64, now: &TimePoint, state: &DisplayState) -> Result<(), DisplayError> {
        trace!("draw frame {} mode {}", frame, state.mode);
        self.set_brightness(if state.mode == Mode::Off { 0 } else { 255 })?;

        self.frame_buf.clear_color(self.palette.off);
        if state.mode != Mode::Off {
            let painter = Painter {
                palette: &self.palette,
                bands: &self.bands,
                mode: state.mode,
                now,
                state,
            };
            for (field, at) in self.page.visible(state.mode, self.debug) {
                painter.field(&mut self.frame_buf, field, at)?;
            }
        }

        self.driver.write_frame(self.frame_buf.as_slice())?;
        self.driver.flush()
    }

    fn blank(&mut self) -> Result<(), DisplayError> {
        self.frame_buf.clear_color(self.palette.off);
        self.driver.clear()
    }
}

/// One frame's worth of inputs for composing fields.
struct Painter<'a> {
    palette: &'a Palette,
    bands: &'a RateBands,
    mode: Mode,
    now: &'a TimePoint,
    state: &'a DisplayState,
}

impl Painter<'_> {
    fn field(&self, fb: &mut VarFrameBuf<Rgb888>, field: &Field, at: Point) -> Result<(), DisplayError> {
        match field.field_type {
            FieldType::Border | FieldType::RateBox(_) => {
                let color = self.outline_color(field.field_type);
                let bounds = Rectangle::new(at, field.bounds.size);
                let radius = Size::new(field.corner_radius, field.corner_radius);
                RoundedRectangle::with_equal_corners(bounds, radius)
                    .into_styled(PrimitiveStyle::with_stroke(color, 1))
                    .draw(fb)?;
                Ok(())
            }
            _ => {
                let Some(font) = field.font else {
                    return Err(DisplayError::DrawingError(format!("{} has no font", field.name)));
                };
                let (text, color) = self.label(field.field_type)?;
                Text::with_baseline(&text, at, MonoTextStyle::new(font, color), Baseline::Middle)
                    .draw(fb)?;
                Ok(())
            }
        }
    }

    fn rate(&self, slot: Slot) -> Option<f64> {
        let rates = self.state.rates.as_deref()?;
        // both periods or neither
        if rates.len() < 2 {
            return None;
        }
        rates.get(slot.index()).map(|r| r.price)
    }

    fn outline_color(&self, field_type: FieldType) -> Rgb888 {
        let p = self.palette;
        match field_type {
            FieldType::Border => self
                .rate(Slot::Current)
                .map_or(p.dimmed, |v| self.bands.rate_to_color(v, p.low, p.high, p.off)),
            FieldType::RateBox(slot) => self
                .rate(slot)
                .map_or(p.dimmed, |v| self.bands.rate_to_color(v, p.low, p.high, p.dimmed)),
            _ => p.off,
        }
    }

    fn label(&self, field_type: FieldType) -> Result<(Label, Rgb888), DisplayError> {
        let p = self.palette;
        let now = self.now;
        let mut s = Label::new();
        let color = match field_type {
            FieldType::DayOfWeek => {
                let weekday = now.weekday.or_else(|| now.to_naive().map(|d| d.weekday()));
                s.push_str(weekday.map_or("...", day_name));
                p.calendar
            }
            FieldType::Date => {
                write!(s, "{:02}/{:02}", now.day, now.month)?;
                p.calendar
            }
            FieldType::Time => {
                write!(s, "{:02}:{:02}", now.hour, now.minute)?;
                p.clock
            }
            FieldType::Rate(slot) => match self.rate(slot) {
                Some(v) => {
                    write!(s, "{}", v.round_ties_even() as i64)?;
                    if self.mode == Mode::On {
                        self.bands.rate_to_color(v, p.label_extreme, p.label_extreme, p.label)
                    } else {
                        self.bands.rate_to_color(v, p.low, p.high, p.calendar)
                    }
                }
                None => {
                    s.push('.');
                    p.dimmed
                }
            },
            FieldType::Cheapest => match self.state.period_lowest {
                Some(at) => {
                    write!(s, "{}", at.format("%H:%M"))?;
                    p.low
                }
                None => {
                    s.push_str("--:--");
                    p.dimmed
                }
            },
            FieldType::Debug => {
                write!(s, "{} {}", self.mode, MachineMetrics::check().mem_avail_mib)?;
                p.label
            }
            FieldType::Border | FieldType::RateBox(_) => p.off,
        };
        Ok((s, color))
    }
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::mock::MockDriver;
    use crate::tariff::RatePoint;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn now() -> TimePoint {
        TimePoint::from_naive(at(14, 7))
    }

    fn state(mode: Mode, prices: &[f64]) -> DisplayState {
        let mut s = DisplayState::new(mode);
        if !prices.is_empty() {
            s.rates = Some(
                prices
                    .iter()
                    .enumerate()
                    .map(|(i, p)| RatePoint { valid_from: at(14, 0) + chrono::Duration::minutes(30 * i as i64), price: *p })
                    .collect(),
            );
            s.period_lowest = Some(at(14, 30));
        }
        s
    }

    fn renderer() -> (MatrixRenderer, MockDriver) {
        let mock = MockDriver::new_with_size(64, 32);
        let r = MatrixRenderer::new(Box::new(mock.clone()), Palette::default(), RateBands { low: 10.0, high: 30.0 }, false);
        (r, mock)
    }

    #[test]
    fn test_off_blanks_panel() {
        let (mut r, mock) = renderer();
        r.draw(0, &now(), &state(Mode::Off, &[5.0, 6.0])).unwrap();

        let st = mock.state();
        assert_eq!(st.lock().unwrap().last_brightness, Some(0));
        assert_eq!(st.lock().unwrap().flush_count, 1);
        assert_eq!(mock.count_lit_pixels(), 0);
    }

    #[test]
    fn test_on_border_follows_current_rate() {
        let (mut r, mock) = renderer();
        let palette = Palette::default();

        r.draw(0, &now(), &state(Mode::On, &[5.0, 40.0])).unwrap();
        assert_eq!(mock.pixel(0, 16), Some(palette.low));
        assert_eq!(mock.state().lock().unwrap().last_brightness, Some(255));

        r.draw(1, &now(), &state(Mode::On, &[45.0, 40.0])).unwrap();
        assert_eq!(mock.pixel(0, 16), Some(palette.high));
        // next box is over the high band as well
        assert_eq!(mock.pixel(35, 16), Some(palette.high));

        // normal band leaves the border off
        r.draw(2, &now(), &state(Mode::On, &[20.0, 40.0])).unwrap();
        assert_eq!(mock.pixel(0, 16), Some(palette.off));
    }

    #[test]
    fn test_on_without_rates_uses_placeholders() {
        let (mut r, mock) = renderer();
        r.draw(0, &now(), &state(Mode::On, &[])).unwrap();
        assert_eq!(mock.pixel(0, 16), Some(Palette::default().dimmed));
        assert!(mock.count_lit_pixels() > 0);
    }

    #[test]
    fn test_dark_hides_frames() {
        let (mut r, mock) = renderer();
        r.draw(0, &now(), &state(Mode::Dark, &[5.0, 6.0])).unwrap();
        assert_eq!(mock.pixel(0, 16), Some(Palette::default().off));
        // ratenow box left edge
        assert_eq!(mock.pixel(7, 16), Some(Palette::default().off));
        assert!(mock.count_lit_pixels() > 0);
    }

    #[test]
    fn test_brightness_only_sent_on_change() {
        let (mut r, mock) = renderer();
        mock.state().lock().unwrap().last_brightness = None;
        r.draw(0, &now(), &state(Mode::On, &[])).unwrap();
        mock.state().lock().unwrap().last_brightness = None;
        r.draw(1, &now(), &state(Mode::On, &[])).unwrap();
        assert_eq!(mock.state().lock().unwrap().last_brightness, None);
    }

    #[test]
    fn test_flush_failure_surfaces() {
        let (mut r, mock) = renderer();
        mock.state().lock().unwrap().simulate_flush_failure = true;
        assert!(r.draw(0, &now(), &state(Mode::On, &[])).is_err());
    }

    #[test]
    fn test_labels() {
        let palette = Palette::default();
        let bands = RateBands { low: 10.0, high: 30.0 };
        let st = state(Mode::On, &[9.6, 31.2]);
        let now = now();
        let painter = Painter { palette: &palette, bands: &bands, mode: Mode::On, now: &now, state: &st };

        assert_eq!(painter.label(FieldType::DayOfWeek).unwrap().0.as_str(), "Sun");
        assert_eq!(painter.label(FieldType::Date).unwrap().0.as_str(), "18/10");
        assert_eq!(painter.label(FieldType::Time).unwrap().0.as_str(), "14:07");
        assert_eq!(painter.label(FieldType::Rate(Slot::Current)).unwrap().0.as_str(), "10");
        assert_eq!(painter.label(FieldType::Rate(Slot::Next)).unwrap().0.as_str(), "31");
        let (cheapest, color) = painter.label(FieldType::Cheapest).unwrap();
        assert_eq!(cheapest.as_str(), "14:30");
        assert_eq!(color, palette.low);
    }

    #[test]
    fn test_single_rate_is_treated_as_missing() {
        let palette = Palette::default();
        let bands = RateBands { low: 10.0, high: 30.0 };
        let st = state(Mode::On, &[9.6]);
        let now = now();
        let painter = Painter { palette: &palette, bands: &bands, mode: Mode::On, now: &now, state: &st };
        assert_eq!(painter.label(FieldType::Rate(Slot::Current)).unwrap().0.as_str(), ".");
    }

    #[test]
    fn test_rate_halves_round_to_even() {
        let palette = Palette::default();
        let bands = RateBands { low: 10.0, high: 30.0 };
        let st = state(Mode::On, &[10.5, 11.5]);
        let now = now();
        let painter = Painter { palette: &palette, bands: &bands, mode: Mode::On, now: &now, state: &st };
        assert_eq!(painter.label(FieldType::Rate(Slot::Current)).unwrap().0.as_str(), "10");
        assert_eq!(painter.label(FieldType::Rate(Slot::Next)).unwrap().0.as_str(), "12");
    }
}
