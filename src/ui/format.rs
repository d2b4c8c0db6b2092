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

//! Display formatting for flight values.

use chrono::{DateTime, Utc};
use opensky_client::{FlightRecord, VerticalTrend};

const NOT_AVAILABLE: &str = "N/A";

pub fn speed(flight: &FlightRecord) -> String {
    flight
        .velocity_kmh()
        .map_or_else(|| NOT_AVAILABLE.to_string(), |kmh| format!("{kmh:.0} km/h"))
}

pub fn altitude(meters: Option<f64>) -> String {
    meters.map_or_else(|| NOT_AVAILABLE.to_string(), |m| format!("{m:.0} m"))
}

pub fn track(flight: &FlightRecord) -> String {
    flight
        .true_track
        .map_or_else(|| NOT_AVAILABLE.to_string(), |deg| format!("{deg:03.0}°"))
}

pub fn vertical_rate(flight: &FlightRecord) -> String {
    let (Some(rate), Some(trend)) = (flight.vertical_rate, flight.vertical_trend()) else {
        return NOT_AVAILABLE.to_string();
    };

    let rounded = rate.round().abs();
    match trend {
        VerticalTrend::Climbing => format!("▲ {rounded:.0} m/s"),
        VerticalTrend::Descending => format!("▼ {rounded:.0} m/s"),
        VerticalTrend::Level => "→ 0 m/s".to_string(),
    }
}

pub fn on_ground(flight: &FlightRecord) -> &'static str {
    if flight.on_ground {
        "Yes"
    } else {
        "No"
    }
}

/// Age of a timestamp relative to `now`, e.g. "T-012s"
pub fn age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds().max(0);
    format!("T-{seconds:03}s")
}

#[cfg(test)]
mod tests {
    use super::*;
    use opensky_client::PositionSource;

    fn flight() -> FlightRecord {
        FlightRecord {
            icao24: "3c6444".to_string(),
            callsign: Some("DLH9LF".to_string()),
            origin_country: "Germany".to_string(),
            longitude: 8.6,
            latitude: 50.0,
            baro_altitude: Some(10_972.8),
            geo_altitude: None,
            on_ground: false,
            velocity: Some(240.0),
            true_track: Some(95.3),
            vertical_rate: Some(-6.5),
            time_position: None,
            last_contact: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            squawk: None,
            spi: false,
            position_source: PositionSource::AdsB,
        }
    }

    #[test]
    fn test_speed_in_kmh() {
        assert_eq!(speed(&flight()), "864 km/h");
        let parked = FlightRecord {
            velocity: None,
            ..flight()
        };
        assert_eq!(speed(&parked), "N/A");
    }

    #[test]
    fn test_altitude_and_track() {
        assert_eq!(altitude(Some(10_972.8)), "10973 m");
        assert_eq!(altitude(None), "N/A");
        assert_eq!(track(&flight()), "095°");
    }

    #[test]
    fn test_vertical_rate_arrows() {
        assert_eq!(vertical_rate(&flight()), "▼ 7 m/s");

        let climbing = FlightRecord {
            vertical_rate: Some(4.2),
            ..flight()
        };
        assert_eq!(vertical_rate(&climbing), "▲ 4 m/s");

        let level = FlightRecord {
            vertical_rate: Some(0.2),
            ..flight()
        };
        assert_eq!(vertical_rate(&level), "→ 0 m/s");

        let unknown = FlightRecord {
            vertical_rate: None,
            ..flight()
        };
        assert_eq!(vertical_rate(&unknown), "N/A");
    }

    #[test]
    fn test_age() {
        let then = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let now = DateTime::from_timestamp(1_700_000_012, 0).unwrap();
        assert_eq!(age(then, now), "T-012s");
        assert_eq!(age(now, then), "T-000s");
    }
}
