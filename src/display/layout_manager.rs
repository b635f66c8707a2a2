/*
 *  display/layout_manager.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Board page geometry for the configured panel size
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

use embedded_graphics::geometry::{Point, Size};
use embedded_graphics::mono_font::ascii::{FONT_4X6, FONT_6X10};
use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::primitives::Rectangle;

use super::field::{Field, FieldType, Slot};
use super::page::PageLayout;

/// Coordinates are designed on a 64x32 panel and scaled by whole
/// multiples for larger ones.
pub struct LayoutManager {
    width: u32,
    height: u32,
}

impl LayoutManager {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn sx(&self) -> i32 {
        (self.width / 64).max(1) as i32
    }

    fn sy(&self) -> i32 {
        (self.height / 32).max(1) as i32
    }

    fn at(&self, x: i32, y: i32) -> Point {
        Point::new(x * self.sx(), y * self.sy())
    }

    fn size(&self, w: u32, h: u32) -> Size {
        Size::new(w * self.sx() as u32, h * self.sy() as u32)
    }

    fn font(&self) -> &'static MonoFont<'static> {
        if self.sx() >= 2 && self.sy() >= 2 { &FONT_6X10 } else { &FONT_4X6 }
    }

    /// Calendar and clock on top, current and next rate boxed below,
    /// cheapest window bottom left.
    pub fn create_board_page(&self) -> PageLayout {
        let font = self.font();
        let ratenow = self.at(7, 11);
        let ratenext = self.at(35, 11);
        let rate_box = self.size(21, 11);
        let label_offset = self.at(3, 5);

        PageLayout::new("board")
            .add_field(Field::new_frame(
                "border",
                FieldType::Border,
                Rectangle::new(Point::zero(), Size::new(self.width, self.height)),
            ))
            .add_field(
                Field::new_text("dow", FieldType::DayOfWeek, self.at(2, 4), font)
                    .dark_at(self.at(0, 2)),
            )
            .add_field(
                Field::new_text("date", FieldType::Date, self.at(16, 4), font)
                    .dark_at(self.at(15, 2)),
            )
            .add_field(
                Field::new_text("time", FieldType::Time, self.at(43, 4), font)
                    .dark_at(self.at(45, 2)),
            )
            .add_field(Field::new_frame(
                "ratenow_box",
                FieldType::RateBox(Slot::Current),
                Rectangle::new(ratenow, rate_box),
            ))
            .add_field(
                Field::new_text("ratenow", FieldType::Rate(Slot::Current), ratenow + label_offset, font)
                    .dark_at(self.at(0, 29)),
            )
            .add_field(Field::new_frame(
                "ratenext_box",
                FieldType::RateBox(Slot::Next),
                Rectangle::new(ratenext, rate_box),
            ))
            .add_field(
                Field::new_text("ratenext", FieldType::Rate(Slot::Next), ratenext + label_offset, font)
                    .dark_at(self.at(12, 29)),
            )
            .add_field(
                Field::new_text("cheapest", FieldType::Cheapest, self.at(4, 27), font)
                    .dark_at(self.at(44, 29)),
            )
            .add_field(
                Field::new_text("debug", FieldType::Debug, self.at(35, 27), font)
                    .dark_at(self.at(0, 8))
                    .debug_only(),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;

    #[test]
    fn test_board_page_64x32() {
        let page = LayoutManager::new(64, 32).create_board_page();

        let border = page.get_field("border").unwrap();
        assert_eq!(border.bounds.size, Size::new(64, 32));

        let ratenow = page.get_field("ratenow").unwrap();
        assert_eq!(ratenow.placement(Mode::On), Some(Point::new(10, 16)));
        assert_eq!(ratenow.placement(Mode::Dark), Some(Point::new(0, 29)));

        let boxed = page.get_field("ratenext_box").unwrap();
        assert_eq!(boxed.bounds, Rectangle::new(Point::new(35, 11), Size::new(21, 11)));
        assert_eq!(boxed.placement(Mode::Dark), None);
    }

    #[test]
    fn test_board_page_scales_up() {
        let page = LayoutManager::new(128, 64).create_board_page();
        let time = page.get_field("time").unwrap();
        assert_eq!(time.placement(Mode::On), Some(Point::new(86, 8)));
        assert_eq!(time.font.map(|f| f.character_size), Some(FONT_6X10.character_size));
    }
}
