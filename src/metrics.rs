/*
 *  metrics.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Host figures for the debug label
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

use std::fs;
use std::io;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MachineMetrics {
    pub up_time: f64,
    pub mem_avail_mib: u64,
}

impl MachineMetrics {
    /// Read what we can; anything unreadable stays zero.
    pub fn check() -> Self {
        Self {
            up_time: up_time().unwrap_or(0.0),
            mem_avail_mib: mem_available_kib().map(|k| k / 1024).unwrap_or(0),
        }
    }
}

/// Uptime in hours
fn up_time() -> io::Result<f64> {
    let content = fs::read_to_string("/proc/uptime")?;
    let first = content.split_whitespace().next().unwrap_or("0");
    let secs = first
        .parse::<f64>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(secs / 3600.0)
}

pub fn mem_available_kib() -> io::Result<u64> {
    let content = fs::read_to_string("/proc/meminfo")?;
    parse_mem_available(&content)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "no MemAvailable in meminfo"))
}

fn parse_mem_available(meminfo: &str) -> Option<u64> {
    meminfo.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("MemAvailable:") => parts.next()?.parse().ok(),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mem_available() {
        let sample = "MemTotal:        3884400 kB\nMemFree:          201412 kB\nMemAvailable:    2456788 kB\nBuffers:           95012 kB\n";
        assert_eq!(parse_mem_available(sample), Some(2456788));
        assert_eq!(parse_mem_available("MemTotal: 1 kB\n"), None);
    }
}
