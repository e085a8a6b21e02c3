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

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use reqwest::Url;

/// Common prefix of every AMeDAS resource published by the JMA.
pub const DEFAULT_ENDPOINT: &str = "https://www.jma.go.jp/bosai/amedas";

/// Reason an endpoint prefix was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEndpoint {
    pub endpoint: String,
    pub reason: &'static str,
}

/// Builds the URL of each resource published under an endpoint prefix.
///
/// All methods are pure: they only depend on the prefix and their arguments and
/// cannot fail once the `Endpoint` has been constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    /// Validate `endpoint` and use it as the prefix of every resource URL.
    ///
    /// The prefix must be an absolute `http://` or `https://` URL. A single
    /// trailing slash is ignored, any other empty path segment is rejected.
    pub fn new(endpoint: &str) -> Result<Self, InvalidEndpoint> {
        let invalid = |reason| InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason,
        };

        let mut base = Url::parse(endpoint).map_err(|_| invalid("not a valid URL"))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(invalid("scheme must be http or https"));
        }

        base.path_segments_mut()
            .map_err(|_| invalid("cannot be used as a base URL"))?
            .pop_if_empty();
        if base.path() != "/" && base.path_segments().map_or(false, |mut p| p.any(str::is_empty)) {
            return Err(invalid("path must not contain empty segments"));
        }

        base.set_query(None);
        base.set_fragment(None);

        Ok(Endpoint { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Plain text resource holding the most recent publication time.
    pub fn latest_time(&self) -> Url {
        self.resource(&["data", "latest_time.txt"])
    }

    /// JSON table of every station, keyed by station ID.
    pub fn station_table(&self) -> Url {
        self.resource(&["const", "amedastable.json"])
    }

    /// Snapshot of every station at `instant`, truncated to the minute.
    ///
    /// Seconds in the resource name are always `00`.
    pub fn all_stations<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> Url {
        let file = format!(
            "{:04}{:02}{:02}{:02}{:02}00.json",
            instant.year(),
            instant.month(),
            instant.day(),
            instant.hour(),
            instant.minute()
        );

        self.resource(&["data", "map", &file])
    }

    /// History of a single station for the three hour window containing `instant`.
    ///
    /// History is only published in windows starting at 00, 03, 06 ... 21 so the
    /// hour is rounded down to a multiple of three. Every instant in `[H, H + 3h)`
    /// maps to the same resource.
    pub fn station_bucket<Tz: TimeZone>(&self, station: &str, instant: &DateTime<Tz>) -> Url {
        let file = format!(
            "{:04}{:02}{:02}_{:02}.json",
            instant.year(),
            instant.month(),
            instant.day(),
            bucket_hour(instant.hour())
        );

        self.resource(&["data", "point", station, &file])
    }

    fn resource(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            // Url::path_segments_mut percent-encodes each segment
            path.extend(segments);
        }

        url
    }
}

/// First hour of the three hour window that contains `hour`.
pub fn bucket_hour(hour: u32) -> u32 {
    hour - hour % 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn jst(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .unwrap()
    }

    fn endpoint() -> Endpoint {
        Endpoint::new(DEFAULT_ENDPOINT).unwrap()
    }

    #[test]
    fn fixed_resources() {
        let e = endpoint();
        assert_eq!(
            "https://www.jma.go.jp/bosai/amedas/data/latest_time.txt",
            e.latest_time().as_str()
        );
        assert_eq!(
            "https://www.jma.go.jp/bosai/amedas/const/amedastable.json",
            e.station_table().as_str()
        );
    }

    #[test]
    fn all_stations_truncates_to_minute() {
        let url = endpoint().all_stations(&jst(2024, 1, 5, 7, 40, 59));
        assert_eq!(
            "https://www.jma.go.jp/bosai/amedas/data/map/20240105074000.json",
            url.as_str()
        );
    }

    #[test]
    fn station_bucket_same_window() {
        let e = endpoint();
        for (h, m) in [(6, 0), (7, 30), (8, 0), (8, 59)] {
            let url = e.station_bucket("44132", &jst(2024, 3, 1, h, m, 0));
            assert_eq!(
                "https://www.jma.go.jp/bosai/amedas/data/point/44132/20240301_06.json",
                url.as_str()
            );
        }
    }

    #[test]
    fn station_bucket_window_boundaries() {
        let e = endpoint();
        let url = e.station_bucket("44132", &jst(2024, 3, 1, 9, 0, 0));
        assert!(url.as_str().ends_with("/44132/20240301_09.json"));

        let url = e.station_bucket("44132", &jst(2024, 3, 1, 9, 59, 0));
        assert!(url.as_str().ends_with("/44132/20240301_09.json"));

        let url = e.station_bucket("44132", &jst(2024, 3, 1, 23, 50, 0));
        assert!(url.as_str().ends_with("/44132/20240301_21.json"));

        let url = e.station_bucket("44132", &jst(2024, 3, 1, 0, 10, 0));
        assert!(url.as_str().ends_with("/44132/20240301_00.json"));
    }

    #[test]
    fn bucket_hour_rounds_down() {
        let hours: Vec<u32> = (0..24).map(bucket_hour).collect();
        assert_eq!(
            vec![0, 0, 0, 3, 3, 3, 6, 6, 6, 9, 9, 9, 12, 12, 12, 15, 15, 15, 18, 18, 18, 21, 21, 21],
            hours
        );
    }

    #[test]
    fn uses_local_fields_of_instant() {
        // 2024-03-01T00:30Z is 09:30 in JST
        let utc = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 0, 30, 0).unwrap();
        let local = utc.with_timezone(&FixedOffset::east_opt(9 * 3600).unwrap());
        assert!(endpoint()
            .station_bucket("1", &local)
            .as_str()
            .ends_with("/20240301_09.json"));
        assert!(endpoint()
            .station_bucket("1", &utc)
            .as_str()
            .ends_with("/20240301_00.json"));
    }

    #[test]
    fn trailing_slash_ignored() {
        let e = Endpoint::new("http://localhost:8080/bosai/amedas/").unwrap();
        assert_eq!(
            "http://localhost:8080/bosai/amedas/data/latest_time.txt",
            e.latest_time().as_str()
        );
    }

    #[test]
    fn repeated_trailing_slash_rejected() {
        let err = Endpoint::new("http://localhost:8080/bosai/amedas//").unwrap_err();
        assert_eq!("path must not contain empty segments", err.reason);
        assert!(Endpoint::new("http://localhost:8080/bosai//amedas").is_err());
    }

    #[test]
    fn host_only_prefix() {
        let e = Endpoint::new("http://localhost:8080").unwrap();
        assert_eq!("http://localhost:8080/data/latest_time.txt", e.latest_time().as_str());

        let e = Endpoint::new("http://localhost:8080/").unwrap();
        assert_eq!("http://localhost:8080/data/latest_time.txt", e.latest_time().as_str());
    }

    #[test]
    fn station_id_is_encoded() {
        let url = endpoint().station_bucket("a/b", &jst(2024, 3, 1, 1, 0, 0));
        assert!(url.as_str().ends_with("/point/a%2Fb/20240301_00.json"));
    }

    #[test]
    fn rejects_bad_prefixes() {
        assert!(Endpoint::new("www.jma.go.jp/bosai/amedas").is_err());
        assert_eq!(
            "scheme must be http or https",
            Endpoint::new("ftp://www.jma.go.jp/bosai").unwrap_err().reason
        );
        assert!(Endpoint::new("mailto:someone@example.com").is_err());
    }
}
