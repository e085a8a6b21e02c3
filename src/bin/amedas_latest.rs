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

use amedas::{AmedasClient, ClientError, DEFAULT_ENDPOINT};
use clap::Parser;
use reqwest::Client;
use std::error::Error;
use std::io;
use std::process;
use std::time::Duration;
use tokio::signal::unix::{self, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Level};

const DEFAULT_LOG_LEVEL: Level = Level::INFO;
const DEFAULT_TIMEOUT_MILLIS: u64 = 5000;

#[derive(Debug, Parser)]
#[clap(name = "amedas_latest", version = clap::crate_version!())]
struct AmedasLatestApplication {
    /// Station ID to print the latest observation of (e.g. 44132). When omitted, the
    /// latest observation of every station is printed.
    #[clap(long)]
    station: Option<String>,

    /// Base URL for the AMeDAS resources, without a trailing slash
    #[clap(long, default_value_t = DEFAULT_ENDPOINT.into())]
    api_url: String,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[clap(long, default_value_t = DEFAULT_LOG_LEVEL)]
    log_level: Level,

    /// Timeout for each request to the AMeDAS resources, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_MILLIS)]
    timeout_millis: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let opts = AmedasLatestApplication::parse();
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(opts.log_level)
            .with_writer(io::stderr)
            .finish(),
    )
    .expect("failed to set tracing subscriber");

    let timeout = Duration::from_millis(opts.timeout_millis);
    let http_client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        tracing::error!(message = "unable to initialize HTTP client", error = %e);
        process::exit(1)
    });

    let client = AmedasClient::new(http_client, &opts.api_url).unwrap_or_else(|e| {
        tracing::error!(message = "invalid API URL", api_url = %opts.api_url, error = %e);
        process::exit(1)
    });

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        // Wait for either SIGTERM or SIGINT to abort any requests
        tokio::select! {
            _ = sigterm() => {}
            _ = sigint() => {}
        }

        signal_cancel.cancel();
    });

    let res = match &opts.station {
        Some(station) => single_station(&client, &cancel, station)
            .instrument(tracing::span!(Level::DEBUG, "amedas_station", station = %station))
            .await,
        None => all_stations(&client, &cancel)
            .instrument(tracing::span!(Level::DEBUG, "amedas_all_stations"))
            .await,
    };

    if let Err(e) = res {
        tracing::error!(message = "failed to fetch observations", api_url = %opts.api_url, error = %e);
        process::exit(1)
    }

    Ok(())
}

async fn single_station(client: &AmedasClient, cancel: &CancellationToken, station: &str) -> Result<(), ClientError> {
    let obs = client.latest_for_station(cancel, station).await?;
    println!("{}: {}", station, obs);
    Ok(())
}

async fn all_stations(client: &AmedasClient, cancel: &CancellationToken) -> Result<(), ClientError> {
    let table = client.station_table(cancel).await?;
    let observations = client.latest_all_stations(cancel).await?;
    tracing::info!(message = "fetched observations", stations = observations.len());

    for (id, obs) in &observations {
        let name = table.get(id).map(|s| s.kanji_name.as_str()).unwrap_or("");
        println!("{}({}): {}", id, name, obs);
    }

    Ok(())
}

/// Return after the first SIGTERM signal received by this process
async fn sigterm() -> io::Result<()> {
    unix::signal(SignalKind::terminate())?.recv().await;
    Ok(())
}

/// Return after the first SIGINT signal received by this process
async fn sigint() -> io::Result<()> {
    unix::signal(SignalKind::interrupt())?.recv().await;
    Ok(())
}
