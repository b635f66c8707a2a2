/*
 *  timesync.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Sets the software clock from an HTTP time service
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

use log::info;
use serde::Deserialize;

use crate::clock::{parse_timestamp, Clock, TimePoint};
use crate::error::{ParseError, SyncError};
use crate::http::HttpGet;

#[derive(Debug, Deserialize)]
struct WorldTime {
    datetime: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TimeSync {
    url: String,
}

impl TimeSync {
    /// `api_url` is the zone collection, e.g. `http://worldtimeapi.org/api/timezone`.
    pub fn new(api_url: &str, timezone: &str) -> Self {
        Self {
            url: format!("{}/{}", api_url.trim_end_matches('/'), timezone),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch local wall time for the configured zone and set `clock` to it.
    /// On any failure the clock is left alone.
    pub async fn sync_clock<H: HttpGet, C: Clock>(
        &self,
        http: &H,
        clock: &mut C,
    ) -> Result<TimePoint, SyncError> {
        let body = http.get_text(&self.url).await?;
        let reply: WorldTime = serde_json::from_str(&body).map_err(ParseError::from)?;
        let raw = reply.datetime.ok_or(ParseError::MissingField("datetime"))?;
        info!("Time: {}", raw);

        let parsed = parse_timestamp(&raw)?;
        let wall = parsed
            .to_naive()
            .ok_or_else(|| ParseError::Timestamp(raw.clone()))?;
        clock.set(wall);
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SoftRtc;
    use crate::http::scripted::ScriptedHttp;

    fn sync() -> TimeSync {
        TimeSync::new("http://worldtimeapi.org/api/timezone/", "Europe/London")
    }

    #[test]
    fn test_url() {
        assert_eq!(sync().url(), "http://worldtimeapi.org/api/timezone/Europe/London");
    }

    #[tokio::test]
    async fn test_sync_sets_clock() {
        let http = ScriptedHttp::new().reply(
            r#"{"abbreviation":"BST","datetime":"2023-07-14T22:15:30.123456+01:00","dst":true}"#,
        );
        let mut rtc = SoftRtc::new();

        let synced = sync().sync_clock(&http, &mut rtc).await.unwrap();

        assert_eq!((synced.hour, synced.minute, synced.second), (22, 15, 30));
        assert!(rtc.is_synced());
        let now = rtc.now();
        assert_eq!((now.year, now.month, now.day, now.hour), (2023, 7, 14, 22));
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_clock_alone() {
        let http = ScriptedHttp::new().fail("unreachable");
        let mut rtc = SoftRtc::new();

        let err = sync().sync_clock(&http, &mut rtc).await.unwrap_err();

        assert!(matches!(err, SyncError::Transport(_)));
        assert!(!rtc.is_synced());
    }

    #[tokio::test]
    async fn test_bad_payloads() {
        let mut rtc = SoftRtc::new();

        let http = ScriptedHttp::new().reply("not json");
        assert!(matches!(
            sync().sync_clock(&http, &mut rtc).await,
            Err(SyncError::Parse(ParseError::Json(_)))
        ));

        let http = ScriptedHttp::new().reply(r#"{"utc_offset":"+01:00"}"#);
        assert!(matches!(
            sync().sync_clock(&http, &mut rtc).await,
            Err(SyncError::Parse(ParseError::MissingField("datetime")))
        ));

        let http = ScriptedHttp::new().reply(r#"{"datetime":"14/07/2023 22:15"}"#);
        assert!(matches!(
            sync().sync_clock(&http, &mut rtc).await,
            Err(SyncError::Parse(ParseError::Timestamp(_)))
        ));

        assert!(!rtc.is_synced());
    }
}
