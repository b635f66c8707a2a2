/*
 *  mode/gpio.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Raspberry Pi GPIO backing for the mode buttons
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

use embedded_hal::digital::{ErrorType, InputPin};
use rppal::gpio::Gpio;
use std::convert::Infallible;
use std::time::Duration;

use super::buttons::ModeButtons;

/// BCM input with the internal pull-up enabled; pressed reads low.
pub struct GpioButton(rppal::gpio::InputPin);

impl ErrorType for GpioButton {
    type Error = Infallible;
}

impl InputPin for GpioButton {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.is_low())
    }
}

pub fn open_buttons(
    down_pin: u8,
    up_pin: u8,
    interval: Duration,
) -> Result<ModeButtons<GpioButton, GpioButton>, String> {
    let gpio = Gpio::new().map_err(|e| format!("GPIO unavailable: {}", e))?;
    let down = gpio
        .get(down_pin)
        .map_err(|e| format!("GPIO {}: {}", down_pin, e))?
        .into_input_pullup();
    let up = gpio
        .get(up_pin)
        .map_err(|e| format!("GPIO {}: {}", up_pin, e))?
        .into_input_pullup();
    ModeButtons::new(GpioButton(down), GpioButton(up), interval)
}
