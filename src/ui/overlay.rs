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

//! Header bar, status overlays and the selected-flight card.

use chrono::{DateTime, Local, Utc};
use egui::{Color32, RichText};
use opensky_client::{FlightRecord, RequestStatus, StoreEvent};

use super::{format, Intents};

const ACCENT: Color32 = Color32::from_rgb(60, 230, 240);
const LABEL: Color32 = Color32::from_rgb(140, 150, 160);
const PANEL_FILL: Color32 = Color32::from_rgba_premultiplied(25, 30, 35, 230);
const PANEL_STROKE: Color32 = Color32::from_rgb(60, 80, 100);

fn panel_frame(ctx: &egui::Context) -> egui::Frame {
    egui::Frame::window(&ctx.style())
        .fill(PANEL_FILL)
        .stroke(egui::Stroke::new(1.0, PANEL_STROKE))
        .corner_radius(6.0)
}

/// Top bar: title, sidebar toggle, zoom buttons and feed summary.
pub fn header(
    ui: &mut egui::Ui,
    sidebar_open: bool,
    flight_count: usize,
    last_updated: Option<DateTime<Local>>,
    intents: &mut Intents,
) {
    ui.horizontal(|ui| {
        let toggle = if sidebar_open { "◀" } else { "▶" };
        if ui
            .button(toggle)
            .on_hover_text(if sidebar_open { "Collapse sidebar" } else { "Expand sidebar" })
            .clicked()
        {
            intents.toggle_sidebar = true;
        }

        ui.label(RichText::new("✈").color(ACCENT).size(20.0));
        ui.label(RichText::new("Live Flight Tracker").size(18.0).strong());

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                intents.zoom += 1.0;
            }
            if ui.button("−").on_hover_text("Zoom out").clicked() {
                intents.zoom -= 1.0;
            }
            ui.separator();

            let updated = last_updated.map_or_else(
                || "waiting for data".to_string(),
                |t| format!("updated {}", t.format("%H:%M:%S")),
            );
            ui.label(RichText::new(updated).color(LABEL).size(11.0));
            ui.label(
                RichText::new(format!("{flight_count} flights"))
                    .color(LABEL)
                    .size(11.0),
            );
        });
    });
}

/// Loading indicator or error window, centered over the map.
pub fn status(ctx: &egui::Context, status: &RequestStatus, intents: &mut Intents) {
    if status.loading {
        egui::Area::new(egui::Id::new("loading_overlay"))
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                panel_frame(ctx).inner_margin(16.0).show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.spinner();
                        ui.add_space(8.0);
                        ui.label(RichText::new("Fetching live flight data...").size(15.0));
                    });
                });
            });
        return;
    }

    if let Some(message) = &status.error {
        egui::Window::new("An Error Occurred")
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .collapsible(false)
            .resizable(false)
            .frame(panel_frame(ctx).stroke(egui::Stroke::new(1.0, Color32::from_rgb(200, 80, 80))))
            .show(ctx, |ui| {
                ui.label(RichText::new(message).color(Color32::from_rgb(240, 170, 170)));
                ui.add_space(8.0);
                if ui.button("Try Again").clicked() {
                    intents.retry = true;
                }
            });
    }
}

/// Detail card for the selected flight.
pub fn selected_card(ctx: &egui::Context, flight: &FlightRecord, intents: &mut Intents) {
    let now = Utc::now();

    egui::Window::new("selected_flight")
        .title_bar(false)
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
        .resizable(false)
        .frame(panel_frame(ctx))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(flight.display_callsign())
                        .color(ACCENT)
                        .size(15.0)
                        .strong(),
                );
                ui.label(RichText::new(&flight.icao24).color(LABEL).monospace());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✕").on_hover_text("Clear selection").clicked() {
                        intents.push(StoreEvent::ClearSelection);
                    }
                });
            });
            ui.separator();

            egui::Grid::new("selected_flight_grid")
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    let mut row = |label: &str, value: String| {
                        ui.label(RichText::new(label).color(LABEL));
                        ui.label(value);
                        ui.end_row();
                    };
                    row("Origin", flight.origin_country.clone());
                    row("Altitude", format::altitude(flight.baro_altitude));
                    row("Geo altitude", format::altitude(flight.geo_altitude));
                    row("Speed", format::speed(flight));
                    row("Heading", format::track(flight));
                    row("Vertical", format::vertical_rate(flight));
                    row("On ground", format::on_ground(flight).to_string());
                    row(
                        "Squawk",
                        flight.squawk.clone().unwrap_or_else(|| "N/A".to_string()),
                    );
                    row("Source", flight.position_source.label().to_string());
                    row(
                        "Position",
                        format!("{:.3}°, {:.3}°", flight.latitude, flight.longitude),
                    );
                    row("Last contact", format::age(flight.last_contact, now));
                });
        });
}
