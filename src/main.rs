/*
 *  main.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Startup, signal handling and fatal recovery
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

use anyhow::Context;
use env_logger::Env;
use local_ip_address::local_ip;
use log::{error, info, warn};
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};

use agileboard::app::App;
use agileboard::clock::SoftRtc;
use agileboard::config::{self, Config};
use agileboard::display::{create_driver, MatrixRenderer};
use agileboard::http::HttpClient;
use agileboard::inbox;
use agileboard::mac_addr::{get_mac_addr, get_mac_addr_for, host_id};
use agileboard::metrics::MachineMetrics;
use agileboard::mode::buttons::{Buttons, NoButtons};
use agileboard::recovery;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Waits for SIGINT, SIGTERM or SIGHUP.
async fn signal_handler() -> Result<(), Box<dyn std::error::Error>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

fn open_buttons(cfg: &Config) -> anyhow::Result<Box<dyn Buttons>> {
    #[cfg(feature = "gpio")]
    if let Some(b) = &cfg.buttons {
        let buttons = agileboard::mode::gpio::open_buttons(
            b.down_pin,
            b.up_pin,
            Duration::from_millis(b.debounce_ms),
        )
        .map_err(anyhow::Error::msg)?;
        info!("Mode buttons on GPIO {} and {}", b.down_pin, b.up_pin);
        return Ok(Box::new(buttons));
    }

    #[cfg(not(feature = "gpio"))]
    if cfg.buttons.is_some() {
        warn!("Buttons configured but built without the gpio feature");
    }

    Ok(Box::new(NoButtons))
}

fn banner() {
    info!("agileboard v.{} built {}", VERSION, BUILD_DATE);

    match get_mac_addr() {
        Some(mac) => info!("Board {} ({})", host_id(&mac), mac),
        None => warn!("No MAC address found"),
    }
    for ifname in ["eth0", "wlan0"] {
        if let Ok(mac) = get_mac_addr_for(ifname) {
            info!("{}: {}", ifname, mac);
        }
    }
    match local_ip() {
        Ok(ip) => info!("IP address {}", ip),
        Err(e) => warn!("No local IP address: {}", e),
    }

    let metrics = MachineMetrics::check();
    info!("Up {:.1}h, {} MiB available", metrics.up_time, metrics.mem_avail_mib);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load()?;

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.effective_log_level()))
        .format_timestamp_secs()
        .init();

    banner();
    info!(
        "Tariff {} every {}m, time from {} every {}h",
        cfg.octopus.product_code, cfg.octopus.update_mins, cfg.timezone, cfg.ntp_update_hours
    );

    let http = HttpClient::new(
        Duration::from_millis(cfg.http.connect_timeout_ms),
        Duration::from_millis(cfg.http.timeout_ms),
    )
    .context("HTTP client")?;

    let mut driver = create_driver(&cfg.display)?;
    driver.init().context("display init")?;
    let renderer = MatrixRenderer::from_config(driver, &cfg);

    let mut app = App::new(&cfg, http, SoftRtc::new(), Box::new(renderer))?
        .with_buttons(open_buttons(&cfg)?);

    if cfg.control.stdin {
        let (tx, rx) = inbox::channel(cfg.control.queue_depth);
        inbox::spawn_stdin_listener(tx);
        info!("Control messages on stdin, prefix '{}'", cfg.control.topic_prefix);
        app = app.with_inbox(rx);
    }

    let fatal = tokio::select! {
        res = signal_handler() => {
            if let Err(e) = res {
                warn!("Signal handler failed: {}", e);
            }
            None
        }
        res = app.run() => match res {
            Ok(never) => match never {},
            Err(e) => Some(e),
        },
    };

    match fatal {
        None => {
            if let Err(e) = app.shutdown() {
                warn!("Display blank failed: {}", e);
            }
            info!("Bye");
            Ok(())
        }
        Some(e) => {
            error!("{}", e);
            recovery::restart(cfg.fatal_action, cfg.debug)
        }
    }
}
