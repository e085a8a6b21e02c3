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

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Every station keyed by its ID, in ID order.
pub type StationTable = BTreeMap<String, Station>;

/// Metadata of a single observation station.
///
/// The ID of a station is not part of the record, it is the key the station is
/// stored under in the station table. See [`StationWithId`] for the two combined.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Station {
    #[serde(rename = "type")]
    pub category: StationCategory,
    #[serde(rename = "elems")]
    pub elements: String,
    #[serde(rename = "lat")]
    pub latitude: Coordinate,
    #[serde(rename = "lon")]
    pub longitude: Coordinate,
    #[serde(rename = "alt")]
    pub altitude: i32,
    #[serde(rename = "kjName")]
    pub kanji_name: String,
    #[serde(rename = "knName")]
    pub kana_name: String,
    #[serde(rename = "enName")]
    pub english_name: String,
}

impl Station {
    /// Latitude in decimal degrees.
    pub fn decimal_latitude(&self) -> f64 {
        self.latitude.decimal()
    }

    /// Longitude in decimal degrees.
    pub fn decimal_longitude(&self) -> f64 {
        self.longitude.decimal()
    }

    /// Return true if the station observes the given kind of measurement.
    pub fn reports(&self, element: Element) -> bool {
        self.elements.as_bytes().get(element as usize) == Some(&b'1')
    }

    /// Return true if any of the names of the station contain `query`.
    ///
    /// An empty query matches every station.
    pub fn matches(&self, query: &str) -> bool {
        self.kanji_name.contains(query) || self.kana_name.contains(query) || self.english_name.contains(query)
    }
}

/// A station along with the ID it is published under.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StationWithId {
    pub id: String,
    #[serde(flatten)]
    pub station: Station,
}

/// Order the stations of a table by ID.
///
/// IDs are compared as strings, so `"10"` comes before `"2"`.
pub fn ordered(table: StationTable) -> Vec<StationWithId> {
    // BTreeMap iterates in byte-wise string order of its keys
    table
        .into_iter()
        .map(|(id, station)| StationWithId { id, station })
        .collect()
}

/// Class of an observation station.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StationCategory {
    /// Regional or district meteorological observatory
    #[serde(rename = "A")]
    Observatory,
    /// Weather station or special regional weather station
    #[serde(rename = "B")]
    WeatherStation,
    /// Automated AMeDAS station
    #[serde(rename = "C")]
    Amedas,
    #[serde(rename = "D")]
    Chichijima,
    #[serde(rename = "E")]
    Minamitorishima,
    #[serde(rename = "F")]
    MountFuji,
}

impl StationCategory {
    pub fn code(&self) -> char {
        match self {
            Self::Observatory => 'A',
            Self::WeatherStation => 'B',
            Self::Amedas => 'C',
            Self::Chichijima => 'D',
            Self::Minamitorishima => 'E',
            Self::MountFuji => 'F',
        }
    }
}

impl fmt::Display for StationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Kinds of measurement a station may report, by their position in the
/// `elems` string of the station table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Temperature = 0,
    Precipitation = 1,
    WindDirection = 2,
    WindSpeed = 3,
    Sunshine = 4,
    SnowDepth = 5,
    Humidity = 6,
    Pressure = 7,
}

/// Latitude or longitude as published: whole degrees and minutes.
///
/// Decoding fails unless the source array has both elements so a `Coordinate`
/// always converts to decimal degrees.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Coordinate {
    pub degrees: f64,
    pub minutes: f64,
}

impl Coordinate {
    pub fn decimal(&self) -> f64 {
        self.degrees + self.minutes / 60.0
    }
}

impl TryFrom<Vec<f64>> for Coordinate {
    type Error = CoordinateError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [degrees, minutes, ..] => Ok(Coordinate {
                degrees: *degrees,
                minutes: *minutes,
            }),
            _ => Err(CoordinateError(value.len())),
        }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.degrees, c.minutes]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateError(usize);

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected [degrees, minutes] coordinate, got {} element(s)", self.0)
    }
}

impl std::error::Error for CoordinateError {}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"{
        "11001": {"type":"C","elems":"11112010","lat":[45,31.2],"lon":[141,56.1],"alt":26,
                  "kjName":"宗谷岬","knName":"ソウヤミサキ","enName":"Cape Soya"},
        "2": {"type":"A","elems":"11111111","lat":[35,30],"lon":[139,45],"alt":25,
              "kjName":"東京","knName":"トウキョウ","enName":"Tokyo"},
        "10": {"type":"F","elems":"10000000","lat":[35,21.6],"lon":[138,43.6],"alt":3775,
               "kjName":"富士山","knName":"フジサン","enName":"Mt. Fuji"}
    }"#;

    fn table() -> StationTable {
        serde_json::from_str(TABLE).unwrap()
    }

    #[test]
    fn decimal_coordinates() {
        let stations = table();
        let tokyo = &stations["2"];
        assert_eq!(35.5, tokyo.decimal_latitude());
        assert_eq!(139.75, tokyo.decimal_longitude());
        assert_eq!(StationCategory::Observatory, tokyo.category);
        assert_eq!(25, tokyo.altitude);
    }

    #[test]
    fn decimal_coordinates_are_stable() {
        let first: Vec<(f64, f64)> = table()
            .values()
            .map(|s| (s.decimal_latitude(), s.decimal_longitude()))
            .collect();
        let second: Vec<(f64, f64)> = table()
            .values()
            .map(|s| (s.decimal_latitude(), s.decimal_longitude()))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn ordered_by_string_id() {
        let ids: Vec<String> = ordered(table()).into_iter().map(|s| s.id).collect();
        assert_eq!(vec!["10", "11001", "2"], ids);
    }

    #[test]
    fn ordered_keeps_station() {
        let stations = ordered(table());
        assert_eq!("Mt. Fuji", stations[0].station.english_name);
        assert_eq!(StationCategory::MountFuji, stations[0].station.category);
    }

    #[test]
    fn missing_minutes_fails_decode() {
        let res = serde_json::from_str::<StationTable>(
            r#"{"1":{"type":"C","elems":"1","lat":[35],"lon":[139,45],"alt":0,"kjName":"","knName":"","enName":""}}"#,
        );
        let err = res.unwrap_err();
        assert!(err.to_string().contains("got 1 element(s)"));
    }

    #[test]
    fn unknown_category_fails_decode() {
        let res = serde_json::from_str::<Station>(
            r#"{"type":"Z","elems":"1","lat":[35,0],"lon":[139,45],"alt":0,"kjName":"","knName":"","enName":""}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn reports_elements() {
        let stations = table();
        let soya = &stations["11001"];
        assert!(soya.reports(Element::Temperature));
        assert!(soya.reports(Element::WindSpeed));
        assert!(!soya.reports(Element::Sunshine));
        assert!(!soya.reports(Element::SnowDepth));
        assert!(soya.reports(Element::Humidity));
        assert!(!soya.reports(Element::Pressure));

        let fuji = &stations["10"];
        assert!(!fuji.reports(Element::Precipitation));
    }

    #[test]
    fn reports_short_elements_string() {
        let mut station = table().remove("2").unwrap();
        station.elements = "1".to_owned();
        assert!(station.reports(Element::Temperature));
        assert!(!station.reports(Element::Pressure));
    }

    #[test]
    fn matches_any_name() {
        let stations = table();
        let soya = &stations["11001"];
        assert!(soya.matches("宗谷"));
        assert!(soya.matches("ソウヤ"));
        assert!(soya.matches("Soya"));
        assert!(soya.matches(""));
        assert!(!soya.matches("soya"));
        assert!(!soya.matches("Tokyo"));
    }

    #[test]
    fn station_with_id_serializes_flat() {
        let stations = ordered(table());
        let json = serde_json::to_value(&stations[2]).unwrap();
        assert_eq!("2", json["id"]);
        assert_eq!("Tokyo", json["enName"]);
        assert_eq!(serde_json::json!([35.0, 30.0]), json["lat"]);
        assert_eq!("A", json["type"]);
    }
}
