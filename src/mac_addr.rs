/*
 *  mac_addr.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Interface addresses for the startup banner
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

use mac_address::get_mac_address;
use std::fs;
use std::io;

pub fn get_mac_addr_for(ifname: &str) -> io::Result<String> {
    let p = format!("/sys/class/net/{}/address", ifname);
    let s = fs::read_to_string(p)?;
    Ok(s.trim().to_ascii_lowercase())
}

/// First non-loopback interface, lower case and colon separated
pub fn get_mac_addr() -> Option<String> {
    match get_mac_address() {
        Ok(Some(mac)) => Some(mac.to_string().to_ascii_lowercase()),
        _ => None,
    }
}

/// Short board id from the leading four octets, as shown at startup
pub fn host_id(mac: &str) -> String {
    mac.split([':', '-'])
        .take(4)
        .collect::<String>()
        .to_ascii_uppercase()
}
