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

use amedas::{AmedasClient, DEFAULT_ENDPOINT};
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
#[clap(name = "amedas_stations", version = clap::crate_version!())]
struct AmedasStationsApplication {
    /// Only list stations with a kanji, kana, or English name containing this text
    #[clap(long, default_value = "")]
    query: String,

    /// Don't print the CSV header line
    #[clap(long)]
    no_header: bool,

    /// Base URL for the AMeDAS resources, without a trailing slash
    #[clap(long, default_value_t = DEFAULT_ENDPOINT.into())]
    api_url: String,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[clap(long, default_value_t = DEFAULT_LOG_LEVEL)]
    log_level: Level,

    /// Timeout for fetching the station table, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_MILLIS)]
    timeout_millis: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let opts = AmedasStationsApplication::parse();
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
        // Wait for either SIGTERM or SIGINT to abort the request
        tokio::select! {
            _ = sigterm() => {}
            _ = sigint() => {}
        }

        signal_cancel.cancel();
    });

    let stations = match client
        .stations(&cancel)
        .instrument(tracing::span!(Level::DEBUG, "amedas_stations"))
        .await
    {
        Ok(stations) => stations,
        Err(e) => {
            tracing::error!(message = "failed to fetch stations", error = %e);
            process::exit(1)
        }
    };

    if !opts.no_header {
        println!("id,lat,lon,kjName,knName,enName");
    }

    for s in stations.iter().filter(|s| s.station.matches(&opts.query)) {
        println!(
            "{},{:.3},{:.3},{},{},{}",
            s.id,
            s.station.decimal_latitude(),
            s.station.decimal_longitude(),
            s.station.kanji_name,
            s.station.kana_name,
            s.station.english_name,
        );
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
