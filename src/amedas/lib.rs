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

//! Client for the JMA AMeDAS weather observation feed
//!
//! ## Features
//!
//! The Japan Meteorological Agency publishes observations from its [AMeDAS] stations as static JSON
//! and text resources under `https://www.jma.go.jp/bosai/amedas`. `amedas` fetches and decodes them.
//!
//! * The time of the most recent observations (`/data/latest_time.txt`).
//! * Metadata of every station: category, location, altitude, names (`/const/amedastable.json`).
//! * Observations of every station at a point in time (`/data/map/YYYYMMDDHHMM00.json`).
//! * Ten minute observations of a single station, published in three hour windows
//!   (`/data/point/ID/YYYYMMDD_HH.json`).
//!
//! Not every station reports every quantity so all fields of an [`Observation`] are optional.
//!
//! [AMeDAS]: https://www.jma.go.jp/bosai/map.html#contents=amedas
//!
//! ## Usage
//!
//! ```no_run
//! use amedas::{AmedasClient, DEFAULT_ENDPOINT};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), amedas::ClientError> {
//! let client = AmedasClient::new(reqwest::Client::new(), DEFAULT_ENDPOINT)?;
//! let cancel = CancellationToken::new();
//!
//! let obs = client.latest_for_station(&cancel, "44132").await?;
//! println!("{} {:?}", obs, obs.wind_direction_label());
//! # Ok(())
//! # }
//! ```
//!
//! Requests are logged at `DEBUG` level using `tracing`. Nothing is logged unless the application
//! installs a subscriber.
//!
//! ## Binaries
//!
//! Two small programs are included.
//!
//! ```text
//! # List stations whose kanji, kana, or English name contains "Tokyo"
//! ./amedas_stations --query Tokyo
//!
//! # Latest observation of a single station, or of every station
//! ./amedas_latest --station 44132
//! ./amedas_latest
//! ```
//!

pub mod client;
pub mod endpoint;
pub mod observation;
pub mod station;

pub use client::{AmedasClient, ClientError, ErrorKind};
pub use endpoint::{Endpoint, DEFAULT_ENDPOINT};
pub use observation::{wind_direction_label, Observation, ObservationSet, Reading, TimeOfDay};
pub use station::{Coordinate, Element, Station, StationCategory, StationTable, StationWithId};
