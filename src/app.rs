/*
 *  app.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  The board loop: boundaries, input, redraw, time sync and rate refresh
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

use log::{debug, info, warn};
use std::convert::Infallible;
use std::time::Duration;

use crate::cheapest::find_lowest_contiguous_period;
use crate::clock::{Boundaries, Clock, EpochTracker};
use crate::config::{Config, ConfigError};
use crate::display::{DisplayError, Renderer};
use crate::error::AppError;
use crate::http::HttpGet;
use crate::inbox::{parse_command, Command, Inbox};
use crate::mode::buttons::{Buttons, NoButtons};
use crate::mode::schedule::ModeSchedule;
use crate::mode::ModeController;
use crate::state::{DisplayState, ErrorCounter};
use crate::tariff::TariffClient;
use crate::timesync::TimeSync;

/// Loop knobs lifted out of the config once.
#[derive(Debug, Clone)]
struct Settings {
    tick: Duration,
    ntp_update_hours: u32,
    update_mins: u32,
    fetch_periods: usize,
    cheapest_periods: usize,
}

/// What a single tick did, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub first: bool,
    pub boundaries: Boundaries,
    pub drew: bool,
    pub synced: bool,
    pub fetched: bool,
}

pub struct App<H: HttpGet, C: Clock> {
    http: H,
    clock: C,
    renderer: Box<dyn Renderer>,
    buttons: Box<dyn Buttons>,
    inbox: Option<Inbox>,
    topic_prefix: String,
    tariff: TariffClient,
    time_sync: TimeSync,
    modes: ModeController,
    schedule: Option<ModeSchedule>,
    state: DisplayState,
    errors: ErrorCounter,
    epoch: EpochTracker,
    synced: bool,
    refresh_requested: bool,
    settings: Settings,
}

impl<H: HttpGet, C: Clock> App<H, C> {
    pub fn new(cfg: &Config, http: H, clock: C, renderer: Box<dyn Renderer>) -> Result<Self, ConfigError> {
        let mut modes = ModeController::new(cfg.modes.clone());
        if let Some(forced) = cfg.mode_force {
            modes.select(forced);
        }
        let schedule = match &cfg.schedule {
            Some(s) => Some(ModeSchedule::from_config(s).map_err(ConfigError::Validation)?),
            None => None,
        }
        .filter(|s| !s.is_empty());

        let o = &cfg.octopus;
        let settings = Settings {
            tick: Duration::from_millis(cfg.tick_ms),
            ntp_update_hours: cfg.ntp_update_hours.max(1),
            update_mins: o.update_mins.max(1),
            fetch_periods: o.fetch_periods,
            cheapest_periods: o.cheapest_periods,
        };

        Ok(Self {
            http,
            clock,
            renderer,
            buttons: Box::new(NoButtons),
            inbox: None,
            topic_prefix: cfg.control.topic_prefix.clone(),
            tariff: TariffClient::from_config(o),
            time_sync: TimeSync::new(&cfg.time_api_url, &cfg.timezone),
            state: DisplayState::new(modes.current()),
            modes,
            schedule,
            errors: ErrorCounter::new(cfg.error_threshold),
            epoch: EpochTracker::new(),
            synced: false,
            refresh_requested: false,
            settings,
        })
    }

    pub fn with_buttons(mut self, buttons: Box<dyn Buttons>) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_inbox(mut self, inbox: Inbox) -> Self {
        self.inbox = Some(inbox);
        self
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn errors(&self) -> &ErrorCounter {
        &self.errors
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// One pass of the loop. Only the error threshold escapes as `Err`.
    pub async fn tick(&mut self) -> Result<TickReport, AppError> {
        let now = self.clock.now();
        let first = !self.epoch.is_initialized();
        let boundaries = self.epoch.advance(self.clock.monotonic(), &now);
        let mut report = TickReport { first, boundaries, ..Default::default() };
        let on_second = boundaries.second || first;

        // input
        if self.buttons.poll(self.clock.monotonic()) {
            self.modes.advance();
        }
        self.apply_inbox();
        if on_second {
            if let Some(mode) = self.schedule.as_mut().and_then(|s| s.due(&now)) {
                debug!("Schedule: {} due", mode);
                self.modes.select(mode);
            }
        }
        self.state.mode = self.modes.current();

        if on_second {
            match self.renderer.draw(self.state.frame, &now, &self.state) {
                Ok(()) => report.drew = true,
                Err(e) => self.errors.record("Draw", &e),
            }
            debug!("State: {}", self.state);
        }

        let hourly = boundaries.hour && now.hour % self.settings.ntp_update_hours == 0;
        if hourly || (!self.synced && on_second) {
            match self.time_sync.sync_clock(&self.http, &mut self.clock).await {
                Ok(t) => {
                    info!("Time synced: {}", t);
                    self.synced = true;
                    report.synced = true;
                }
                Err(e) => self.errors.record("Time sync", &e),
            }
        }

        if self.synced {
            let scheduled = boundaries.minute && now.minute % self.settings.update_mins == 0;
            let missing = self.state.rates.is_none() && on_second;
            if scheduled || missing || self.refresh_requested {
                self.refresh_requested = false;
                report.fetched = self.refresh_rates().await;
            }
        }

        self.errors.check()?;
        self.state.frame += 1;
        Ok(report)
    }

    /// Fetch against a fresh clock read, since a sync may just have moved it.
    async fn refresh_rates(&mut self) -> bool {
        let wall = self.clock.now();
        match self.tariff.fetch_rates(&self.http, &wall, self.settings.fetch_periods).await {
            Ok(rates) => {
                self.state.period_lowest = find_lowest_contiguous_period(&rates, self.settings.cheapest_periods);
                info!(
                    "Rates: {} period(s), cheapest {} from {}",
                    rates.len(),
                    self.settings.cheapest_periods,
                    self.state
                        .period_lowest
                        .map_or_else(|| "n/a".to_string(), |at| at.format("%H:%M").to_string())
                );
                self.state.rates = Some(rates);
                true
            }
            Err(e) => {
                self.errors.record("Rates", &e);
                false
            }
        }
    }

    fn apply_inbox(&mut self) {
        let Some(inbox) = self.inbox.as_mut() else {
            return;
        };
        for msg in inbox.drain() {
            match parse_command(&self.topic_prefix, &msg) {
                Some(Command::SetMode(mode)) => {
                    self.modes.select(mode);
                }
                Some(Command::NextMode) => {
                    self.modes.advance();
                }
                Some(Command::Refresh) => {
                    info!("Control: refresh requested");
                    self.refresh_requested = true;
                }
                None => warn!("Control: ignored {} '{}'", msg.topic, msg.payload),
            }
        }
    }

    /// Tick forever at the configured cadence.
    pub async fn run(&mut self) -> Result<Infallible, AppError> {
        info!("Start event loop, tick {:?}", self.settings.tick);
        loop {
            self.tick().await?;
            tokio::time::sleep(self.settings.tick).await;
        }
    }

    /// Leave the panel dark on the way out.
    pub fn shutdown(&mut self) -> Result<(), DisplayError> {
        info!("Blanking display");
        self.renderer.blank()
    }
}
