/*
 *  http.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Plain GET transport shared by the tariff and time services
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

use flate2::read::GzDecoder;
use log::debug;
use reqwest::{header, Client};
use std::io::Read;
use std::time::Duration;

use crate::error::TransportError;

const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

/// One GET, body as text. Retrying is left to the caller.
#[allow(async_fn_in_trait)]
pub trait HttpGet {
    async fn get_text(&self, url: &str) -> Result<String, TransportError>;
}

/// reqwest backed transport with fixed headers and timeouts.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Result<Self, TransportError> {
        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));
        headers.insert("Accept-Encoding", header::HeaderValue::from_static("gzip"));
        headers.insert("Connection", header::HeaderValue::from_static("close"));

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

impl HttpGet for HttpClient {
    async fn get_text(&self, url: &str) -> Result<String, TransportError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let raw = response.bytes().await?;
        Ok(decode_body(&raw))
    }
}

/// Servers honour Accept-Encoding unevenly, so sniff for a gzip member
/// before falling back to the raw bytes.
pub fn decode_body(raw: &[u8]) -> String {
    if raw.starts_with(&[0x1f, 0x8b]) {
        let mut decoder = GzDecoder::new(raw);
        let mut decoded = String::new();
        if decoder.read_to_string(&mut decoded).is_ok() {
            return decoded;
        }
    }
    String::from_utf8_lossy(raw).to_string()
}
