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

//! Search and watchlist sidebar.

use egui::{Color32, RichText};
use opensky_client::{FlightRecord, StoreEvent, Views};

use super::{format, Intents};

const HEADING: Color32 = Color32::from_rgb(100, 180, 220);
const MUTED: Color32 = Color32::from_rgb(150, 150, 150);
const SELECTED_FILL: Color32 = Color32::from_rgba_premultiplied(20, 70, 80, 200);
const ITEM_FILL: Color32 = Color32::from_rgba_premultiplied(45, 50, 58, 220);

/// Which list an item is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    SearchResult { watched: bool },
    Watched,
}

/// Draw the sidebar contents.
///
/// `search_input` is the text-box buffer. Edits are forwarded as
/// [`StoreEvent::SetSearchTerm`] so the store stays authoritative.
pub fn show(
    ui: &mut egui::Ui,
    views: &Views<'_>,
    search_term: &str,
    search_input: &mut String,
    is_watched: impl Fn(&str) -> bool,
    intents: &mut Intents,
) {
    let selected = views.selected.map(|f| f.icao24.as_str());

    ui.add_space(6.0);
    ui.label(RichText::new("◈ SEARCH FLIGHTS").color(HEADING).size(13.0).strong());
    let edit = ui.add(
        egui::TextEdit::singleline(search_input)
            .hint_text("Search by callsign...")
            .desired_width(f32::INFINITY),
    );
    if edit.changed() {
        intents.push(StoreEvent::SetSearchTerm(search_input.clone()));
    }

    if !search_term.is_empty() {
        ui.add_space(8.0);
        ui.label(
            RichText::new(format!("Search Results ({})", views.search_results.len()))
                .color(HEADING)
                .strong(),
        );
        egui::ScrollArea::vertical()
            .id_salt("search_results")
            .max_height(260.0)
            .show(ui, |ui| {
                if views.search_results.is_empty() {
                    ui.label(RichText::new("No flights found.").color(MUTED).size(12.0));
                }
                for flight in &views.search_results {
                    let kind = ItemKind::SearchResult {
                        watched: is_watched(&flight.icao24),
                    };
                    flight_item(ui, flight, kind, selected, intents);
                }
            });
    }

    ui.add_space(8.0);
    ui.separator();
    ui.label(
        RichText::new(format!("◈ WATCHLIST ({})", views.watchlist.len()))
            .color(HEADING)
            .size(13.0)
            .strong(),
    );
    egui::ScrollArea::vertical()
        .id_salt("watchlist")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if views.watchlist.is_empty() {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("Your watchlist is empty.").color(MUTED).size(12.0));
                    ui.label(
                        RichText::new("Search for flights to add them.")
                            .color(MUTED)
                            .size(12.0),
                    );
                });
            }
            for flight in &views.watchlist {
                flight_item(ui, flight, ItemKind::Watched, selected, intents);
            }
        });
}

fn flight_item(
    ui: &mut egui::Ui,
    flight: &FlightRecord,
    kind: ItemKind,
    selected: Option<&str>,
    intents: &mut Intents,
) {
    let is_selected = selected == Some(flight.icao24.as_str());
    let fill = if is_selected { SELECTED_FILL } else { ITEM_FILL };
    let mut button_clicked = false;

    let frame = egui::Frame::group(ui.style())
        .fill(fill)
        .stroke(if is_selected {
            egui::Stroke::new(1.0, Color32::from_rgb(80, 220, 230))
        } else {
            egui::Stroke::NONE
        })
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(
                        RichText::new(flight.display_callsign())
                            .color(Color32::WHITE)
                            .strong(),
                    );
                    ui.label(RichText::new(&flight.origin_country).color(MUTED).size(11.0));
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    button_clicked = match kind {
                        ItemKind::Watched => {
                            let remove = ui
                                .button(RichText::new("✕").color(Color32::from_rgb(230, 110, 110)))
                                .on_hover_text("Remove from watchlist");
                            if remove.clicked() {
                                intents.push(StoreEvent::RemoveFromWatchlist(flight.icao24.clone()));
                            }
                            remove.clicked()
                        }
                        ItemKind::SearchResult { watched } => {
                            let add = ui
                                .add_enabled(
                                    !watched,
                                    egui::Button::new(
                                        RichText::new("+").color(Color32::from_rgb(110, 220, 130)),
                                    ),
                                )
                                .on_hover_text("Add to watchlist")
                                .on_disabled_hover_text("Already on watchlist");
                            if add.clicked() {
                                intents.push(StoreEvent::AddToWatchlist(flight.icao24.clone()));
                            }
                            add.clicked()
                        }
                    };
                });
            });

            ui.horizontal(|ui| {
                let stat = |text: String| RichText::new(text).color(MUTED).size(11.0);
                ui.label(stat(format!("SPD {}", format::speed(flight))));
                ui.label(stat(format!("ALT {}", format::altitude(flight.baro_altitude))));
            });
            ui.horizontal(|ui| {
                let stat = |text: String| RichText::new(text).color(MUTED).size(11.0);
                ui.label(stat(format!("HDG {}", format::track(flight))));
                ui.label(stat(format!("V/S {}", format::vertical_rate(flight))));
            });
        });

    let response = frame.response.interact(egui::Sense::click());
    if response.clicked() && !button_clicked {
        intents.push(StoreEvent::Select(flight.icao24.clone()));
    }
    ui.add_space(4.0);
}
