/*
 *  lib.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Crate root
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

pub mod app;
pub mod cheapest;
pub mod clock;
pub mod config;
pub mod deutils;
pub mod display;
pub mod error;
pub mod http;
pub mod inbox;
pub mod mac_addr;
pub mod metrics;
pub mod mode;
pub mod recovery;
pub mod state;
pub mod tariff;
pub mod timesync;
pub mod vframebuf;

pub use app::{App, TickReport};
pub use error::AppError;
