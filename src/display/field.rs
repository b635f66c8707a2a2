/*
 *  display/field.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Declarative board elements and their per-mode placement
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

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::mode::Mode;

/// Which of the fetched periods a rate element shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Current,
    Next,
}

impl Slot {
    pub fn index(&self) -> usize {
        match self {
            Slot::Current => 0,
            Slot::Next => 1,
        }
    }
}

/// Field type determines content and colour role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Panel outline, coloured by the current rate
    Border,
    /// Rounded box behind a rate label
    RateBox(Slot),
    DayOfWeek,
    Date,
    Time,
    Rate(Slot),
    /// Start of the cheapest upcoming window
    Cheapest,
    /// Mode and free memory
    Debug,
}

impl FieldType {
    pub fn is_text(&self) -> bool {
        !matches!(self, FieldType::Border | FieldType::RateBox(_))
    }
}

/// One element on the board.
///
/// `bounds.top_left` is where it sits in ON mode; text is anchored on
/// its vertical middle. DARK mode uses `dark_position`, and an element
/// without one is not drawn in DARK. Nothing is drawn in OFF.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub bounds: Rectangle,
    pub dark_position: Option<Point>,
    pub font: Option<&'static MonoFont<'static>>,
    pub corner_radius: u32,
    pub debug_only: bool,
}

impl Field {
    pub fn new_text(
        name: impl Into<String>,
        field_type: FieldType,
        position: Point,
        font: &'static MonoFont<'static>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type,
            bounds: Rectangle::new(position, Size::zero()),
            dark_position: None,
            font: Some(font),
            corner_radius: 0,
            debug_only: false,
        }
    }

    pub fn new_frame(name: impl Into<String>, field_type: FieldType, bounds: Rectangle) -> Self {
        Self {
            name: name.into(),
            field_type,
            bounds,
            dark_position: None,
            font: None,
            corner_radius: 1,
            debug_only: false,
        }
    }

    /// Builder: where the element moves to in DARK mode
    pub fn dark_at(mut self, position: Point) -> Self {
        self.dark_position = Some(position);
        self
    }

    /// Builder: only shown when running with debug on
    pub fn debug_only(mut self) -> Self {
        self.debug_only = true;
        self
    }

    pub fn corner_radius(mut self, radius: u32) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn placement(&self, mode: Mode) -> Option<Point> {
        match mode {
            Mode::On => Some(self.bounds.top_left),
            Mode::Dark => self.dark_position,
            Mode::Off => None,
        }
    }
}
