/*
 *  error.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error kinds for the fetch, sync and control loop paths
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

use thiserror::Error;

/// Network level failure: unreachable host, timeout or a non-success status.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("transport error: {0}")]
    Other(String),
}

/// Malformed payload from a remote service.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid timestamp '{0}'")]
    Timestamp(String),
    #[error("missing field '{0}'")]
    MissingField(&'static str),
}

/// Rate fetch outcome once retries are spent.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("rate fetch failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },
    #[error("rate payload rejected: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("time service unreachable: {0}")]
    Transport(#[from] TransportError),
    #[error("time service payload rejected: {0}")]
    Parse(#[from] ParseError),
}

/// Loop level failures. Only escalation ends the loop.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("too many errors: {count} failures exceeds threshold of {threshold}")]
    TooManyErrors { count: u32, threshold: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_reports_attempts() {
        let err = FetchError::Transport {
            attempts: 3,
            source: TransportError::Other("connection refused".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("3 attempt"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_parse_error_converts_into_sync_error() {
        let err: SyncError = ParseError::Timestamp("garbage".into()).into();
        assert!(matches!(err, SyncError::Parse(ParseError::Timestamp(_))));
    }
}
