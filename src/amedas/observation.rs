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

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Observations keyed by station ID (all station snapshot) or by time label
/// (single station history), in string order of the key.
pub type ObservationSet = BTreeMap<String, Observation>;

/// Compass directions for wind direction codes 1 through 16, starting at
/// north-northeast and going clockwise to north.
const WIND_DIRECTION_LABELS: [&str; 16] = [
    "北北東", "北東", "東北東", "東", "東南東", "南東", "南南東", "南", "南南西", "南西", "西南西", "西", "西北西", "北西",
    "北北西", "北",
];

/// Label of a wind direction code, `None` for calm (`0`) or unknown codes.
pub fn wind_direction_label(code: i32) -> Option<&'static str> {
    usize::try_from(code)
        .ok()
        .and_then(|c| c.checked_sub(1))
        .and_then(|i| WIND_DIRECTION_LABELS.get(i))
        .copied()
}

/// Remove and return the entry with the greatest key.
///
/// Keys are compared as strings. `None` if the set is empty.
pub fn latest_entry(mut set: ObservationSet) -> Option<(String, Observation)> {
    set.pop_last()
}

/// A single quantity as published: `[value, quality flag]`.
///
/// Either element may be `null` in the source. Only the first element is the
/// measured value, the flag is carried along without interpretation. An empty
/// array `[]` decodes to a present field with no value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct Reading<T>(pub Vec<Option<T>>);

impl<T: Copy> Reading<T> {
    pub fn value(&self) -> Option<T> {
        self.0.first().copied().flatten()
    }

    pub fn quality(&self) -> Option<T> {
        self.0.get(1).copied().flatten()
    }
}

/// Time of day an extreme value of the day was recorded.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}

/// Readings of one station at one point in time.
///
/// Stations only report some quantities so every field is optional. A field
/// missing from the source is `None` here and is omitted again when serialized.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Station pressure, hPa
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<Reading<f64>>,
    /// Sea level pressure, hPa
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal_pressure: Option<Reading<f64>>,
    /// Temperature, degrees celsius
    #[serde(rename = "temp", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Reading<f64>>,
    /// Relative humidity, percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<Reading<i32>>,
    /// Visibility, km
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Reading<f64>>,
    /// Snow depth, cm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snow: Option<Reading<i32>>,
    /// Snowfall, cm
    #[serde(rename = "snow1h", skip_serializing_if = "Option::is_none")]
    pub snow_1h: Option<Reading<i32>>,
    #[serde(rename = "snow6h", skip_serializing_if = "Option::is_none")]
    pub snow_6h: Option<Reading<i32>>,
    #[serde(rename = "snow12h", skip_serializing_if = "Option::is_none")]
    pub snow_12h: Option<Reading<i32>>,
    #[serde(rename = "snow24h", skip_serializing_if = "Option::is_none")]
    pub snow_24h: Option<Reading<i32>>,
    /// Sunshine in the last 10 minutes, minutes (0-10)
    #[serde(rename = "sun10m", skip_serializing_if = "Option::is_none")]
    pub sun_10m: Option<Reading<f64>>,
    /// Sunshine in the last hour, hours (0-1)
    #[serde(rename = "sun1h", skip_serializing_if = "Option::is_none")]
    pub sun_1h: Option<Reading<f64>>,
    /// Precipitation, mm
    #[serde(rename = "precipitation10m", skip_serializing_if = "Option::is_none")]
    pub precipitation_10m: Option<Reading<f64>>,
    #[serde(rename = "precipitation1h", skip_serializing_if = "Option::is_none")]
    pub precipitation_1h: Option<Reading<f64>>,
    #[serde(rename = "precipitation3h", skip_serializing_if = "Option::is_none")]
    pub precipitation_3h: Option<Reading<f64>>,
    #[serde(rename = "precipitation24h", skip_serializing_if = "Option::is_none")]
    pub precipitation_24h: Option<Reading<f64>>,
    /// Wind direction code, 1 (north-northeast) through 16 (north)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<Reading<i32>>,
    /// Wind speed, m/s
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind: Option<Reading<f64>>,
    /// JIS prefecture code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pref_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation_number: Option<i32>,
    #[serde(rename = "maxTemp", skip_serializing_if = "Option::is_none")]
    pub max_temperature: Option<Reading<f64>>,
    #[serde(rename = "maxTempTime", skip_serializing_if = "Option::is_none")]
    pub max_temperature_time: Option<TimeOfDay>,
    #[serde(rename = "minTemp", skip_serializing_if = "Option::is_none")]
    pub min_temperature: Option<Reading<f64>>,
    #[serde(rename = "minTempTime", skip_serializing_if = "Option::is_none")]
    pub min_temperature_time: Option<TimeOfDay>,
    /// Maximum gust of the day, m/s
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gust: Option<Reading<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gust_direction: Option<Reading<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gust_time: Option<TimeOfDay>,
}

fn value<T: Copy>(reading: &Option<Reading<T>>) -> Option<T> {
    reading.as_ref().and_then(Reading::value)
}

impl Observation {
    pub fn pressure(&self) -> Option<f64> {
        value(&self.pressure)
    }

    pub fn normal_pressure(&self) -> Option<f64> {
        value(&self.normal_pressure)
    }

    pub fn temperature(&self) -> Option<f64> {
        value(&self.temperature)
    }

    pub fn humidity(&self) -> Option<i32> {
        value(&self.humidity)
    }

    pub fn visibility(&self) -> Option<f64> {
        value(&self.visibility)
    }

    pub fn snow(&self) -> Option<i32> {
        value(&self.snow)
    }

    pub fn snow_1h(&self) -> Option<i32> {
        value(&self.snow_1h)
    }

    pub fn snow_6h(&self) -> Option<i32> {
        value(&self.snow_6h)
    }

    pub fn snow_12h(&self) -> Option<i32> {
        value(&self.snow_12h)
    }

    pub fn snow_24h(&self) -> Option<i32> {
        value(&self.snow_24h)
    }

    pub fn sun_10m(&self) -> Option<f64> {
        value(&self.sun_10m)
    }

    pub fn sun_1h(&self) -> Option<f64> {
        value(&self.sun_1h)
    }

    pub fn precipitation_10m(&self) -> Option<f64> {
        value(&self.precipitation_10m)
    }

    pub fn precipitation_1h(&self) -> Option<f64> {
        value(&self.precipitation_1h)
    }

    pub fn precipitation_3h(&self) -> Option<f64> {
        value(&self.precipitation_3h)
    }

    pub fn precipitation_24h(&self) -> Option<f64> {
        value(&self.precipitation_24h)
    }

    pub fn wind_direction(&self) -> Option<i32> {
        value(&self.wind_direction)
    }

    pub fn wind(&self) -> Option<f64> {
        value(&self.wind)
    }

    pub fn max_temperature(&self) -> Option<f64> {
        value(&self.max_temperature)
    }

    pub fn min_temperature(&self) -> Option<f64> {
        value(&self.min_temperature)
    }

    pub fn gust(&self) -> Option<f64> {
        value(&self.gust)
    }

    pub fn gust_direction(&self) -> Option<i32> {
        value(&self.gust_direction)
    }

    /// Compass label of the current wind direction, if any.
    pub fn wind_direction_label(&self) -> Option<&'static str> {
        self.wind_direction().and_then(wind_direction_label)
    }

    /// Compass label of the direction of the maximum gust of the day, if any.
    pub fn gust_direction_label(&self) -> Option<&'static str> {
        self.gust_direction().and_then(wind_direction_label)
    }
}

/// Comma separated `name=value` pairs of every field that has a value.
impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        let mut push = |name: &str, v: Option<String>| {
            if let Some(v) = v {
                parts.push(format!("{}={}", name, v));
            }
        };

        let direction = |code: Option<i32>| {
            code.map(|c| match wind_direction_label(c) {
                Some(label) => format!("{}({})", c, label),
                None => c.to_string(),
            })
        };

        push("pressure", value(&self.pressure).map(|v| v.to_string()));
        push("normalPressure", value(&self.normal_pressure).map(|v| v.to_string()));
        push("temp", value(&self.temperature).map(|v| v.to_string()));
        push("humidity", value(&self.humidity).map(|v| v.to_string()));
        push("visibility", value(&self.visibility).map(|v| v.to_string()));
        push("snow", value(&self.snow).map(|v| v.to_string()));
        push("snow1h", value(&self.snow_1h).map(|v| v.to_string()));
        push("snow6h", value(&self.snow_6h).map(|v| v.to_string()));
        push("snow12h", value(&self.snow_12h).map(|v| v.to_string()));
        push("snow24h", value(&self.snow_24h).map(|v| v.to_string()));
        push("sun10m", value(&self.sun_10m).map(|v| v.to_string()));
        push("sun1h", value(&self.sun_1h).map(|v| v.to_string()));
        push("precipitation10m", value(&self.precipitation_10m).map(|v| v.to_string()));
        push("precipitation1h", value(&self.precipitation_1h).map(|v| v.to_string()));
        push("precipitation3h", value(&self.precipitation_3h).map(|v| v.to_string()));
        push("precipitation24h", value(&self.precipitation_24h).map(|v| v.to_string()));
        push("windDirection", direction(self.wind_direction()));
        push("wind", value(&self.wind).map(|v| v.to_string()));
        push("prefNumber", self.pref_number.map(|v| v.to_string()));
        push("observationNumber", self.observation_number.map(|v| v.to_string()));
        push("maxTemp", value(&self.max_temperature).map(|v| v.to_string()));
        push("maxTempTime", self.max_temperature_time.map(|v| v.to_string()));
        push("minTemp", value(&self.min_temperature).map(|v| v.to_string()));
        push("minTempTime", self.min_temperature_time.map(|v| v.to_string()));
        push("gust", value(&self.gust).map(|v| v.to_string()));
        push("gustDirection", direction(self.gust_direction()));
        push("gustTime", self.gust_time.map(|v| v.to_string()));

        f.write_str(&parts.join(","))
    }
}
