/*
 *  display/mod.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - board composition over swappable drivers
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod factory;
pub mod color;

// Display drivers
pub mod drivers;

// Field-based layout system
pub mod field;
pub mod page;
pub mod layout_manager;

pub mod renderer;

// Re-exports for convenience
pub use traits::{BoxedDriver, DisplayCapabilities, DisplayDriver, Renderer};
pub use error::DisplayError;
pub use factory::create_driver;
pub use color::{Palette, RateBands};
pub use field::{Field, FieldType, Slot};
pub use page::PageLayout;
pub use layout_manager::LayoutManager;
pub use renderer::MatrixRenderer;
