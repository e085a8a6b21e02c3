// amedas - Client for the JMA AMeDAS weather observation feed
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::endpoint::{Endpoint, InvalidEndpoint};
use crate::observation::{self, Observation, ObservationSet};
use crate::station::{self, StationTable, StationWithId};
use chrono::{DateTime, FixedOffset, TimeZone};
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::error;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Broad category of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The client was constructed with a bad endpoint prefix.
    Configuration,
    /// The request failed, was cancelled, or returned a non-200 status.
    Transport,
    /// The response body was not valid JSON for the resource or not a valid timestamp.
    Decode,
    /// A "latest" query had nothing to pick from.
    Selection,
}

#[derive(Debug)]
pub enum ClientError {
    InvalidEndpoint(InvalidEndpoint),
    Internal(reqwest::Error),
    Cancelled(Url),
    Unexpected(StatusCode, Url, String),
    Json(Url, serde_json::Error),
    Timestamp(String, chrono::ParseError),
    EmptyBucket(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidEndpoint(_) => ErrorKind::Configuration,
            Self::Internal(_) | Self::Cancelled(_) | Self::Unexpected(..) => ErrorKind::Transport,
            Self::Json(..) | Self::Timestamp(..) => ErrorKind::Decode,
            Self::EmptyBucket(_) => ErrorKind::Selection,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEndpoint(e) => write!(f, "invalid endpoint {}: {}", e.endpoint, e.reason),
            Self::Internal(e) => write!(f, "{}", e),
            Self::Cancelled(url) => write!(f, "request cancelled for {}", url),
            Self::Unexpected(status, url, body) => write!(f, "unexpected status {} for {}: {}", status, url, body),
            Self::Json(url, e) => write!(f, "unable to decode response from {}: {}", url, e),
            Self::Timestamp(text, e) => write!(f, "invalid timestamp {:?}: {}", text, e),
            Self::EmptyBucket(station) => write!(f, "no observations for station {}", station),
        }
    }
}

impl error::Error for ClientError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Internal(e) => Some(e),
            Self::Json(_, e) => Some(e),
            Self::Timestamp(_, e) => Some(e),
            _ => None,
        }
    }
}

/// Read-only client for the AMeDAS resources published under an [`Endpoint`].
///
/// The client holds no mutable state and can be shared between tasks. Each
/// method makes at most two requests and never retries. Every request can be
/// aborted with the `CancellationToken` passed to the method, in which case
/// the method returns [`ClientError::Cancelled`].
#[derive(Debug, Clone)]
pub struct AmedasClient {
    client: Client,
    endpoint: Endpoint,
}

impl AmedasClient {
    const USER_AGENT: &'static str = concat!("amedas/", env!("CARGO_PKG_VERSION"));

    /// Create a client making requests with `client` to resources under `endpoint`.
    ///
    /// Timeouts and TLS settings are whatever `client` was built with.
    pub fn new(client: Client, endpoint: &str) -> Result<Self, ClientError> {
        let endpoint = Endpoint::new(endpoint).map_err(ClientError::InvalidEndpoint)?;
        Ok(AmedasClient { client, endpoint })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Time of the most recent observations published.
    pub async fn latest_time(&self, cancel: &CancellationToken) -> Result<DateTime<FixedOffset>, ClientError> {
        let body = self.fetch(cancel, self.endpoint.latest_time()).await?;
        let text = String::from_utf8_lossy(&body).trim().to_owned();
        DateTime::parse_from_rfc3339(&text).map_err(|e| ClientError::Timestamp(text, e))
    }

    /// Every station keyed by ID.
    pub async fn station_table(&self, cancel: &CancellationToken) -> Result<StationTable, ClientError> {
        self.decode(cancel, self.endpoint.station_table()).await
    }

    /// Every station, ordered by ID using string comparison.
    pub async fn stations(&self, cancel: &CancellationToken) -> Result<Vec<StationWithId>, ClientError> {
        let table = self.station_table(cancel).await?;
        Ok(station::ordered(table))
    }

    /// Observations of every station at `instant`.
    pub async fn all_stations<Tz: TimeZone>(
        &self,
        cancel: &CancellationToken,
        instant: &DateTime<Tz>,
    ) -> Result<ObservationSet, ClientError> {
        self.decode(cancel, self.endpoint.all_stations(instant)).await
    }

    /// Observations of every station at the most recent publication time.
    pub async fn latest_all_stations(&self, cancel: &CancellationToken) -> Result<ObservationSet, ClientError> {
        let latest = self.latest_time(cancel).await?;
        self.all_stations(cancel, &latest).await
    }

    /// Ten minute observations of `station` for the three hour window containing `instant`.
    pub async fn station_history<Tz: TimeZone>(
        &self,
        cancel: &CancellationToken,
        station: &str,
        instant: &DateTime<Tz>,
    ) -> Result<ObservationSet, ClientError> {
        self.decode(cancel, self.endpoint.station_bucket(station, instant)).await
    }

    /// Most recent observation of `station`.
    ///
    /// This is the entry with the greatest time label, compared as strings, in
    /// the window containing the most recent publication time.
    pub async fn latest_for_station(&self, cancel: &CancellationToken, station: &str) -> Result<Observation, ClientError> {
        let latest = self.latest_time(cancel).await?;
        let history = self.station_history(cancel, station, &latest).await?;

        let (key, obs) =
            observation::latest_entry(history).ok_or_else(|| ClientError::EmptyBucket(station.to_owned()))?;
        tracing::debug!(message = "selected latest observation", station = %station, key = %key);
        Ok(obs)
    }

    async fn decode<T: DeserializeOwned>(&self, cancel: &CancellationToken, url: Url) -> Result<T, ClientError> {
        let body = self.fetch(cancel, url.clone()).await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Json(url, e))
    }

    async fn fetch(&self, cancel: &CancellationToken, url: Url) -> Result<Vec<u8>, ClientError> {
        tracing::debug!(message = "making request", url = %url);

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!(message = "request cancelled", url = %url);
                Err(ClientError::Cancelled(url))
            }
            res = self.make_request(url.clone()) => res,
        }
    }

    async fn make_request(&self, url: Url) -> Result<Vec<u8>, ClientError> {
        let res = self
            .client
            .get(url.clone())
            .header(USER_AGENT, Self::USER_AGENT)
            .send()
            .await
            .map_err(ClientError::Internal)?;

        // Error responses carry a human readable body, read it either way
        let status = res.status();
        let body = res.bytes().await.map_err(ClientError::Internal)?;

        if status == StatusCode::OK {
            Ok(body.to_vec())
        } else {
            Err(ClientError::Unexpected(
                status,
                url,
                String::from_utf8_lossy(&body).into_owned(),
            ))
        }
    }
}
