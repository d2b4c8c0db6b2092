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

//! Main application state and frame loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use log::{info, warn};
use opensky_client::{
    AppStore, FetchError, Fetcher, FileStore, FlightFeed, Notifier, ProjectionCache,
};

use crate::config::AppConfig;
use crate::map::MapView;
use crate::ui::{self, Intents};

/// Zoom level used when jumping to a newly selected flight.
const FOCUS_ZOOM: f32 = 7.0;

pub struct FlightWatchApp {
    store: AppStore<FileStore>,
    projections: ProjectionCache,
    feed: FlightFeed,
    map: MapView,
    /// Text-box buffer mirrored into the store's search term
    search_input: String,
    sidebar_open: bool,
    /// Selection the map was last centered on
    last_centered: Option<String>,
    last_updated: Option<DateTime<Local>>,
}

impl std::fmt::Debug for FlightWatchApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightWatchApp")
            .field("store", &self.store)
            .field("feed", &self.feed)
            .field("map", &self.map)
            .finish_non_exhaustive()
    }
}

impl FlightWatchApp {
    /// Build the app and start polling. Must run inside a tokio runtime.
    pub fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig) -> Result<Self, FetchError> {
        let storage_path = config.resolve_storage_path();
        info!("Watchlist storage: {}", storage_path.display());
        let store = AppStore::new(FileStore::new(storage_path), config.store_config());

        let ctx = cc.egui_ctx.clone();
        let notifier: Notifier = Arc::new(move || ctx.request_repaint());

        let fetcher = Fetcher::new(config.fetcher_config())?;
        let feed = FlightFeed::spawn(fetcher, config.refresh_interval(), Some(notifier));

        Ok(Self {
            store,
            projections: ProjectionCache::new(),
            feed,
            map: MapView::new(config.map_center_lat, config.map_center_lon, config.default_zoom),
            search_input: String::new(),
            sidebar_open: config.sidebar_open,
            last_centered: None,
            last_updated: None,
        })
    }

    /// Apply queued feed events to the store.
    fn apply_feed_events(&mut self) {
        for event in self.feed.drain() {
            let before = self.store.snapshot_revision();
            self.store.process_event(event.into());
            if self.store.snapshot_revision() != before {
                self.last_updated = Some(Local::now());
            }
        }
    }

    fn apply_intents(&mut self, intents: Intents) {
        for event in intents.events {
            self.store.process_event(event);
        }
        if intents.retry && !self.feed.refresh_now() {
            warn!("Retry requested but the refresh timer is stopped");
        }
        if intents.toggle_sidebar {
            self.sidebar_open = !self.sidebar_open;
        }
        if intents.zoom.abs() > f32::EPSILON {
            self.map.zoom_by(intents.zoom);
        }
    }

    /// Center the map once on each newly selected flight.
    fn follow_selection(&mut self) {
        let selected = self.store.selected().map(str::to_string);
        if selected == self.last_centered {
            return;
        }

        if let Some(flight) = self.projections.views(&self.store).selected {
            self.map.center_on(flight.latitude, flight.longitude);
            self.map.zoom = self.map.zoom.max(FOCUS_ZOOM);
        }
        self.last_centered = selected;
    }
}

impl eframe::App for FlightWatchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keep "last contact" ages ticking between refreshes
        ctx.request_repaint_after(Duration::from_secs(1));

        self.apply_feed_events();
        self.projections.update(&self.store);
        self.follow_selection();

        let mut intents = Intents::default();
        let views = self.projections.views(&self.store);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            ui::overlay::header(
                ui,
                self.sidebar_open,
                self.store.flights().len(),
                self.last_updated,
                &mut intents,
            );
            ui.add_space(4.0);
        });

        if self.sidebar_open {
            egui::SidePanel::left("sidebar")
                .resizable(false)
                .exact_width(360.0)
                .show(ctx, |ui| {
                    ui::sidebar::show(
                        ui,
                        &views,
                        self.store.search_term(),
                        &mut self.search_input,
                        |icao24| self.store.is_watched(icao24),
                        &mut intents,
                    );
                });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                ui::map_panel::show(
                    ui,
                    &mut self.map,
                    self.store.flights(),
                    views.selected,
                    &mut intents,
                );
            });

        if let Some(flight) = views.selected {
            ui::overlay::selected_card(ctx, flight, &mut intents);
        }
        ui::overlay::status(ctx, self.store.status(), &mut intents);

        self.apply_intents(intents);
    }
}

impl Drop for FlightWatchApp {
    fn drop(&mut self) {
        info!("Shutting down flight feed");
        self.feed.shutdown();
    }
}
