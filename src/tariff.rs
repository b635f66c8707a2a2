/*
 *  tariff.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Half-hourly unit rates from the Octopus products API
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

use chrono::{DateTime, NaiveDateTime, TimeDelta};
use log::{debug, info, warn};
use serde::Deserialize;

use crate::clock::TimePoint;
use crate::config::OctopusConfig;
use crate::deutils::deserialize_numeric_f64;
use crate::error::{FetchError, ParseError, TransportError};
use crate::http::HttpGet;

pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One priced period, `valid_from` already shifted to display time.
#[derive(Debug, Clone, PartialEq)]
pub struct RatePoint {
    pub valid_from: NaiveDateTime,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    results: Vec<RateRecord>,
}

#[derive(Debug, Deserialize)]
struct RateRecord {
    valid_from: String,
    #[serde(deserialize_with = "deserialize_numeric_f64")]
    value_inc_vat: f64,
}

// The feed labels periods an hour behind the wall clock the board shows.
fn upstream_shift() -> TimeDelta {
    TimeDelta::hours(1)
}

#[derive(Debug, Clone)]
pub struct TariffClient {
    base_url: String,
    product_code: String,
    tariff_code: String,
    period_minutes: u32,
    max_attempts: u32,
}

impl TariffClient {
    pub fn new(
        base_url: impl Into<String>,
        product_code: impl Into<String>,
        tariff_code: Option<String>,
        period_minutes: u32,
        max_attempts: u32,
    ) -> Self {
        let product_code = product_code.into();
        let tariff_code = tariff_code.unwrap_or_else(|| default_tariff_code(&product_code));
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            product_code,
            tariff_code,
            period_minutes: period_minutes.max(1),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(cfg: &OctopusConfig) -> Self {
        Self::new(
            cfg.api_url.clone(),
            cfg.product_code.clone(),
            cfg.tariff_code.clone(),
            cfg.period_mins,
            cfg.max_attempts,
        )
    }

    pub fn tariff_code(&self) -> &str {
        &self.tariff_code
    }

    /// Start at the period boundary at or before `now`, `window_size` periods long.
    pub fn window(
        &self,
        now: &TimePoint,
        window_size: usize,
    ) -> Result<(NaiveDateTime, NaiveDateTime), ParseError> {
        let period = self.period_minutes;
        let start = TimePoint {
            minute: now.minute - now.minute % period,
            second: 0,
            ..*now
        }
        .to_naive()
        .ok_or_else(|| ParseError::Timestamp(now.to_string()))?;

        let span = i64::from(period) * window_size as i64;
        Ok((start, start + TimeDelta::minutes(span)))
    }

    pub fn rates_url(&self, from: NaiveDateTime, to: NaiveDateTime) -> String {
        format!(
            "{}/v1/products/{}/electricity-tariffs/{}/standard-unit-rates?period_from={}&period_to={}",
            self.base_url,
            self.product_code,
            self.tariff_code,
            from.format(ISO_FORMAT),
            to.format(ISO_FORMAT),
        )
    }

    /// Fetch `window_size` periods starting at the current one.
    ///
    /// Transport failures are retried straight away up to the attempt
    /// limit. A body that will not parse is returned as is.
    pub async fn fetch_rates<H: HttpGet>(
        &self,
        http: &H,
        now: &TimePoint,
        window_size: usize,
    ) -> Result<Vec<RatePoint>, FetchError> {
        let (from, to) = self.window(now, window_size)?;
        info!(
            "Rates: now={} from={} to={}",
            now,
            from.format(ISO_FORMAT),
            to.format(ISO_FORMAT)
        );
        let url = self.rates_url(from, to);

        let mut attempt = 0;
        let last: TransportError = loop {
            attempt += 1;
            match http.get_text(&url).await {
                Ok(body) => {
                    let rates = parse_rates(&body, window_size)?;
                    debug!("Rates: {} period(s) after {} attempt(s)", rates.len(), attempt);
                    return Ok(rates);
                }
                Err(e) => {
                    warn!("Rates: attempt {}/{} failed: {}", attempt, self.max_attempts, e);
                    if attempt >= self.max_attempts {
                        break e;
                    }
                }
            }
        };

        Err(FetchError::Transport { attempts: attempt, source: last })
    }
}

pub fn default_tariff_code(product_code: &str) -> String {
    format!("E-1R-{}-A", product_code)
}

/// Decode a standard-unit-rates body: sorted by start, shifted, capped
/// at `window_size` entries.
pub fn parse_rates(body: &str, window_size: usize) -> Result<Vec<RatePoint>, ParseError> {
    let response: RatesResponse = serde_json::from_str(body)?;

    let mut rates = response
        .results
        .into_iter()
        .map(|r| {
            Ok(RatePoint {
                valid_from: parse_valid_from(&r.valid_from)? + upstream_shift(),
                price: r.value_inc_vat,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    rates.sort_by_key(|r| r.valid_from);
    rates.truncate(window_size);
    Ok(rates)
}

fn parse_valid_from(raw: &str) -> Result<NaiveDateTime, ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|_| ParseError::Timestamp(raw.to_string()))
}
