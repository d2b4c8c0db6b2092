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

//! Map canvas with flight markers.
//!
//! No base tiles are drawn; the canvas shows a lat/lon graticule under the
//! flight markers.

use egui::{Color32, Pos2, Stroke};
use opensky_client::{FlightRecord, StoreEvent};

use super::Intents;
use crate::map::MapView;

const BACKGROUND: Color32 = Color32::from_rgb(18, 24, 32);
const GRID: Color32 = Color32::from_rgb(38, 50, 64);
const EQUATOR: Color32 = Color32::from_rgb(60, 78, 98);
const MARKER: Color32 = Color32::from_rgb(255, 200, 60);
const MARKER_SELECTED: Color32 = Color32::from_rgb(60, 230, 240);

const MARKER_SIZE: f32 = 7.0;
/// Click radius in screen pixels for picking a marker.
const PICK_RADIUS: f32 = 10.0;

/// Draw the map and collect interaction.
pub fn show(
    ui: &mut egui::Ui,
    map: &mut MapView,
    flights: &[FlightRecord],
    selected: Option<&FlightRecord>,
    intents: &mut Intents,
) {
    let (response, painter) =
        ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
    let rect = response.rect;
    let center = rect.center();

    // Pan and pinch/ctrl-scroll zoom
    if response.dragged() {
        let delta = response.drag_delta();
        map.pan_pixels(f64::from(delta.x), f64::from(delta.y));
    }
    if response.hovered() {
        let zoom_delta = ui.input(egui::InputState::zoom_delta);
        if (zoom_delta - 1.0).abs() > f32::EPSILON {
            map.zoom_by(zoom_delta.log2());
        }
    }

    painter.rect_filled(rect, 0.0, BACKGROUND);

    #[allow(clippy::cast_possible_truncation, reason = "screen offsets fit in f32")]
    let to_screen = |lat: f64, lon: f64| -> Pos2 {
        let (dx, dy) = map.project(lat, lon);
        Pos2::new(center.x + dx as f32, center.y + dy as f32)
    };

    draw_graticule(&painter, rect, map, &to_screen);

    let selected_icao = selected.map(|f| f.icao24.as_str());
    let mut nearest: Option<(f32, &str)> = None;
    let pointer = response.interact_pointer_pos();

    for flight in flights {
        let pos = to_screen(flight.latitude, flight.longitude);
        if !rect.expand(MARKER_SIZE).contains(pos) {
            continue;
        }
        if Some(flight.icao24.as_str()) != selected_icao {
            draw_marker(&painter, pos, heading(flight), MARKER_SIZE, MARKER);
        }
        if let Some(pointer) = pointer {
            let distance = pointer.distance(pos);
            if distance <= PICK_RADIUS && nearest.is_none_or(|(d, _)| distance < d) {
                nearest = Some((distance, flight.icao24.as_str()));
            }
        }
    }

    // Selected marker on top
    if let Some(flight) = selected {
        let pos = to_screen(flight.latitude, flight.longitude);
        draw_marker(&painter, pos, heading(flight), MARKER_SIZE * 1.5, MARKER_SELECTED);
        painter.text(
            pos + egui::vec2(14.0, 0.0),
            egui::Align2::LEFT_CENTER,
            flight.display_callsign(),
            egui::FontId::proportional(12.0),
            Color32::WHITE,
        );
    }

    if response.clicked() {
        if let Some((_, icao24)) = nearest {
            intents.push(StoreEvent::Select(icao24.to_string()));
        }
    }

    if let Some(hover) = response.hover_pos() {
        let (lat, lon) = map.unproject(
            f64::from(hover.x - center.x),
            f64::from(hover.y - center.y),
        );
        painter.text(
            rect.left_bottom() + egui::vec2(8.0, -8.0),
            egui::Align2::LEFT_BOTTOM,
            format!("{lat:>7.3}° {lon:>8.3}°  Z{:.1}", map.zoom),
            egui::FontId::monospace(11.0),
            Color32::from_rgb(140, 150, 160),
        );
    }

    painter.text(
        rect.right_bottom() + egui::vec2(-8.0, -8.0),
        egui::Align2::RIGHT_BOTTOM,
        "Flight data © The OpenSky Network",
        egui::FontId::proportional(10.0),
        Color32::from_rgb(120, 130, 140),
    );
}

/// Heading in degrees, north when unknown.
#[allow(clippy::cast_possible_truncation, reason = "degrees fit in f32")]
fn heading(flight: &FlightRecord) -> f32 {
    flight.true_track.unwrap_or(0.0) as f32
}

/// Aircraft-like triangle pointing along `heading` (degrees clockwise from north).
fn draw_marker(painter: &egui::Painter, pos: Pos2, heading: f32, size: f32, color: Color32) {
    let (sin, cos) = heading.to_radians().sin_cos();
    let rotate = |x: f32, y: f32| pos + egui::vec2(x * cos - y * sin, x * sin + y * cos);

    let points = vec![
        rotate(0.0, -size),
        rotate(size * 0.6, size * 0.7),
        rotate(0.0, size * 0.35),
        rotate(-size * 0.6, size * 0.7),
    ];
    painter.add(egui::Shape::convex_polygon(
        points,
        color,
        Stroke::new(1.0, Color32::from_black_alpha(160)),
    ));
}

fn draw_graticule(
    painter: &egui::Painter,
    rect: egui::Rect,
    map: &MapView,
    to_screen: &impl Fn(f64, f64) -> Pos2,
) {
    let step = graticule_step(map.zoom);
    let (top_lat, left_lon) = map.unproject(
        f64::from(rect.left() - rect.center().x),
        f64::from(rect.top() - rect.center().y),
    );
    let (bottom_lat, right_lon) = map.unproject(
        f64::from(rect.right() - rect.center().x),
        f64::from(rect.bottom() - rect.center().y),
    );

    let mut lon = (left_lon / step).floor() * step;
    while lon <= right_lon {
        let x = to_screen(0.0, lon).x;
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, GRID),
        );
        lon += step;
    }

    let mut lat = (bottom_lat / step).floor() * step;
    while lat <= top_lat {
        let y = to_screen(lat, 0.0).y;
        let color = if lat.abs() < f64::EPSILON { EQUATOR } else { GRID };
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, color),
        );
        lat += step;
    }
}

/// Grid spacing in degrees for a zoom level
fn graticule_step(zoom: f32) -> f64 {
    match zoom {
        z if z < 4.0 => 30.0,
        z if z < 6.0 => 10.0,
        z if z < 8.0 => 5.0,
        z if z < 10.0 => 1.0,
        _ => 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graticule_gets_finer_with_zoom() {
        assert_eq!(graticule_step(2.0), 30.0);
        assert_eq!(graticule_step(5.0), 10.0);
        assert_eq!(graticule_step(9.5), 1.0);
        assert_eq!(graticule_step(12.0), 0.5);
    }
}
