/*
 *  recovery.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Last resort restart once the loop gives up
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

use log::{error, info};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exit status the service unit keys its restart on.
pub const FATAL_EXIT_CODE: i32 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FatalAction {
    /// exit non-zero and let the supervisor restart us
    Exit,
    /// reboot the whole board
    Reboot,
}

pub fn fatal_delay(debug: bool) -> Duration {
    Duration::from_secs(if debug { 10 } else { 1 })
}

/// Never returns.
pub fn restart(action: FatalAction, debug: bool) -> ! {
    let delay = fatal_delay(debug);
    info!("Restarting ({:?}) in {}s", action, delay.as_secs());
    std::thread::sleep(delay);

    if action == FatalAction::Reboot {
        // SAFETY: plain syscalls, no memory is handed to the kernel
        let rc = unsafe {
            libc::sync();
            libc::reboot(libc::RB_AUTOBOOT)
        };
        error!(
            "Reboot refused (rc {}): {}, exiting instead",
            rc,
            std::io::Error::last_os_error()
        );
    }

    std::process::exit(FATAL_EXIT_CODE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_follows_debug() {
        assert_eq!(fatal_delay(true), Duration::from_secs(10));
        assert_eq!(fatal_delay(false), Duration::from_secs(1));
    }

    #[test]
    fn test_action_names() {
        let a: FatalAction = serde_yaml::from_str("reboot").unwrap();
        assert_eq!(a, FatalAction::Reboot);
        assert_eq!(serde_yaml::to_string(&FatalAction::Exit).unwrap().trim(), "exit");
    }
}
