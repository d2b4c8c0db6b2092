// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Flight data model.
//!
//! [`StateVector`] mirrors the positional tuple served by the OpenSky
//! `states/all` endpoint. [`FlightRecord`] is the display-friendly form the
//! rest of the crate works with.

use chrono::{DateTime, Utc};
use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// Label shown for flights without a usable callsign.
pub const UNKNOWN_CALLSIGN: &str = "Unknown";

/// Dead band (m/s) inside which a rounded vertical rate counts as level.
const LEVEL_FLIGHT_BAND: f64 = 0.5;

/// Raw state vector as served by OpenSky.
///
/// Fields in order: icao24, callsign, origin country, time position,
/// last contact, longitude, latitude, baro altitude, on ground, velocity,
/// true track, vertical rate, sensors, geo altitude, squawk, spi,
/// position source. Trailing elements past these (such as the aircraft
/// category) are ignored. Timestamps are read as unix seconds and may be
/// fractional.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector(
    pub String,
    pub Option<String>,
    pub String,
    pub Option<f64>,
    pub f64,
    pub Option<f64>,
    pub Option<f64>,
    pub Option<f64>,
    pub bool,
    pub Option<f64>,
    pub Option<f64>,
    pub Option<f64>,
    pub Option<Vec<i64>>,
    pub Option<f64>,
    pub Option<String>,
    pub bool,
    pub i64,
);

/// Number of positions read from each state vector.
const STATE_VECTOR_LEN: usize = 17;

impl<'de> Deserialize<'de> for StateVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(StateVectorVisitor)
    }
}

struct StateVectorVisitor;

impl<'de> Visitor<'de> for StateVectorVisitor {
    type Value = StateVector;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a state vector array of at least {STATE_VECTOR_LEN} elements")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<StateVector, A::Error> {
        let mut index = 0;

        macro_rules! element {
            () => {{
                let value = seq
                    .next_element()?
                    .ok_or_else(|| <A::Error as de::Error>::invalid_length(index, &self))?;
                index += 1;
                value
            }};
        }

        let state = StateVector(
            element!(),
            element!(),
            element!(),
            element!(),
            element!(),
            element!(),
            element!(),
            element!(),
            element!(),
            element!(),
            element!(),
            element!(),
            element!(),
            element!(),
            element!(),
            element!(),
            element!(),
        );

        while seq.next_element::<IgnoredAny>()?.is_some() {}

        Ok(state)
    }
}

/// Response envelope of the `states/all` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StatesResponse {
    /// Server time the snapshot refers to (unix seconds).
    #[serde(default)]
    pub time: Option<f64>,
    /// State vectors, absent when nothing is tracked.
    #[serde(default)]
    pub states: Option<Vec<StateVector>>,
}

/// Origin of an aircraft's position report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    AdsB,
    Asterix,
    Mlat,
    Flarm,
    Unknown(i64),
}

impl PositionSource {
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::AdsB,
            1 => Self::Asterix,
            2 => Self::Mlat,
            3 => Self::Flarm,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::AdsB => "ADS-B",
            Self::Asterix => "ASTERIX",
            Self::Mlat => "MLAT",
            Self::Flarm => "FLARM",
            Self::Unknown(_) => "Unknown",
        }
    }
}

/// Climb/descent classification of a vertical rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalTrend {
    Climbing,
    Descending,
    Level,
}

impl VerticalTrend {
    /// Classify a vertical rate in m/s after rounding to whole meters.
    #[must_use]
    pub fn from_rate(rate: f64) -> Self {
        let rounded = rate.round();
        if rounded > LEVEL_FLIGHT_BAND {
            Self::Climbing
        } else if rounded < -LEVEL_FLIGHT_BAND {
            Self::Descending
        } else {
            Self::Level
        }
    }
}

/// One tracked aircraft at its last known time.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    /// ICAO 24-bit address (hex string). Unique within a snapshot.
    pub icao24: String,
    /// Trimmed callsign. `None` when the source had no callsign at all.
    pub callsign: Option<String>,
    pub origin_country: String,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Barometric altitude in meters.
    pub baro_altitude: Option<f64>,
    /// Geometric altitude in meters.
    pub geo_altitude: Option<f64>,
    pub on_ground: bool,
    /// Ground speed in m/s.
    pub velocity: Option<f64>,
    /// True track in degrees (0-360, north = 0).
    pub true_track: Option<f64>,
    /// Vertical rate in m/s (positive = climb).
    pub vertical_rate: Option<f64>,
    /// Time of the last position report.
    pub time_position: Option<DateTime<Utc>>,
    /// Time of the last message of any kind.
    pub last_contact: DateTime<Utc>,
    pub squawk: Option<String>,
    /// Special purpose indicator.
    pub spi: bool,
    pub position_source: PositionSource,
}

impl FlightRecord {
    /// Build a record from a raw state vector.
    ///
    /// Returns `None` if the vector has no longitude or latitude, since a
    /// record without a position can't be placed on the map.
    #[must_use]
    pub fn from_state_vector(sv: StateVector) -> Option<Self> {
        let StateVector(
            icao24,
            callsign,
            origin_country,
            time_position,
            last_contact,
            longitude,
            latitude,
            baro_altitude,
            on_ground,
            velocity,
            true_track,
            vertical_rate,
            _sensors,
            geo_altitude,
            squawk,
            spi,
            position_source,
        ) = sv;

        let (longitude, latitude) = (longitude?, latitude?);

        Some(Self {
            icao24,
            callsign: normalize_callsign(callsign),
            origin_country,
            longitude,
            latitude,
            baro_altitude,
            geo_altitude,
            on_ground,
            velocity,
            true_track,
            vertical_rate,
            time_position: time_position.and_then(timestamp),
            last_contact: timestamp(last_contact).unwrap_or_default(),
            squawk,
            spi,
            position_source: PositionSource::from_code(position_source),
        })
    }

    /// Callsign for display, falling back to [`UNKNOWN_CALLSIGN`] when
    /// absent or blank.
    #[must_use]
    pub fn display_callsign(&self) -> &str {
        match self.callsign.as_deref() {
            Some(callsign) if !callsign.is_empty() => callsign,
            _ => UNKNOWN_CALLSIGN,
        }
    }

    /// Ground speed in km/h.
    #[must_use]
    pub fn velocity_kmh(&self) -> Option<f64> {
        self.velocity.map(|v| v * 3.6)
    }

    #[must_use]
    pub fn vertical_trend(&self) -> Option<VerticalTrend> {
        self.vertical_rate.map(VerticalTrend::from_rate)
    }

    /// Case-insensitive callsign substring match.
    ///
    /// `needle_lower` must already be lowercase. Records without a callsign
    /// never match.
    #[must_use]
    pub fn callsign_contains(&self, needle_lower: &str) -> bool {
        self.callsign
            .as_deref()
            .is_some_and(|callsign| callsign.to_lowercase().contains(needle_lower))
    }
}

/// Unix seconds to a UTC timestamp, dropping any fractional part.
#[allow(clippy::cast_possible_truncation, reason = "out-of-range seconds saturate and are rejected below")]
fn timestamp(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp(secs.trunc() as i64, 0)
}

/// Null or empty callsigns become `None`; anything else is trimmed, so a
/// whitespace-only callsign survives as a present-but-blank string.
fn normalize_callsign(raw: Option<String>) -> Option<String> {
    match raw {
        Some(callsign) if !callsign.is_empty() => Some(callsign.trim().to_string()),
        _ => None,
    }
}
