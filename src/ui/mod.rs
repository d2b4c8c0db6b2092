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

//! UI components for FlightWatch Desktop.
//!
//! Components only read store state and projections. User actions are
//! collected into [`Intents`] and applied by the app after the frame is laid
//! out.

pub mod format;
pub mod map_panel;
pub mod overlay;
pub mod sidebar;

use opensky_client::StoreEvent;

/// User actions gathered while drawing one frame.
#[derive(Debug, Default)]
pub struct Intents {
    /// Store transitions, applied in order.
    pub events: Vec<StoreEvent>,
    /// Refresh immediately.
    pub retry: bool,
    /// Show or hide the sidebar.
    pub toggle_sidebar: bool,
    /// Zoom change in levels.
    pub zoom: f32,
}

impl Intents {
    pub fn push(&mut self, event: StoreEvent) {
        self.events.push(event);
    }
}
