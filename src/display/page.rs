/*
 *  display/page.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  A named set of fields drawn together
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

use embedded_graphics::prelude::*;

use super::field::Field;
use crate::mode::Mode;

#[derive(Debug, Clone)]
pub struct PageLayout {
    pub name: String,
    /// Draw order; later fields paint over earlier ones
    pub fields: Vec<Field>,
}

impl PageLayout {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    pub fn add_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Fields drawn in `mode`, each with the point it is drawn at.
    pub fn visible(&self, mode: Mode, debug: bool) -> impl Iterator<Item = (&Field, Point)> {
        self.fields
            .iter()
            .filter(move |f| debug || !f.debug_only)
            .filter_map(move |f| f.placement(mode).map(|p| (f, p)))
    }
}
