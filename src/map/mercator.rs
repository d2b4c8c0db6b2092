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

//! Web Mercator projection and map viewport.

use std::f64::consts::PI;

/// Pixel size of one world tile at zoom 0.
pub const TILE_SIZE: f64 = 256.0;

pub const MIN_ZOOM: f32 = 2.0;
pub const MAX_ZOOM: f32 = 12.0;

/// Latitude limit of the square Web Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128;

/// Web Mercator projection utilities
pub struct WebMercator;

impl WebMercator {
    fn world_size(zoom: f64) -> f64 {
        TILE_SIZE * 2_f64.powf(zoom)
    }

    /// Convert latitude to world pixel Y at a (fractional) zoom level
    pub fn lat_to_y(lat: f64, zoom: f64) -> f64 {
        let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
        y * Self::world_size(zoom)
    }

    /// Convert longitude to world pixel X at a (fractional) zoom level
    pub fn lon_to_x(lon: f64, zoom: f64) -> f64 {
        ((lon + 180.0) / 360.0) * Self::world_size(zoom)
    }

    /// Convert world pixel Y back to latitude
    pub fn y_to_lat(y: f64, zoom: f64) -> f64 {
        let n = y / Self::world_size(zoom);
        let lat_rad = (PI * (1.0 - 2.0 * n)).sinh().atan();
        lat_rad.to_degrees()
    }

    /// Convert world pixel X back to longitude
    pub fn x_to_lon(x: f64, zoom: f64) -> f64 {
        x / Self::world_size(zoom) * 360.0 - 180.0
    }
}

/// Pan/zoom state of the map panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center_lat: f64,
    pub center_lon: f64,
    /// Float for smooth pinch-zoom
    pub zoom: f32,
}

impl MapView {
    pub fn new(center_lat: f64, center_lon: f64, zoom: f32) -> Self {
        let mut view = Self {
            center_lat: 0.0,
            center_lon: 0.0,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        };
        view.center_on(center_lat, center_lon);
        view
    }

    fn zoom_f64(&self) -> f64 {
        f64::from(self.zoom)
    }

    /// Pixel offset of a position from the viewport center
    pub fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        let zoom = self.zoom_f64();
        let x = WebMercator::lon_to_x(lon, zoom) - WebMercator::lon_to_x(self.center_lon, zoom);
        let y = WebMercator::lat_to_y(lat, zoom) - WebMercator::lat_to_y(self.center_lat, zoom);
        (x, y)
    }

    /// Position at a pixel offset from the viewport center
    pub fn unproject(&self, dx: f64, dy: f64) -> (f64, f64) {
        let zoom = self.zoom_f64();
        let x = WebMercator::lon_to_x(self.center_lon, zoom) + dx;
        let y = WebMercator::lat_to_y(self.center_lat, zoom) + dy;
        (WebMercator::y_to_lat(y, zoom), WebMercator::x_to_lon(x, zoom))
    }

    /// Move the map by a drag delta in pixels
    pub fn pan_pixels(&mut self, dx: f64, dy: f64) {
        let (lat, lon) = self.unproject(-dx, -dy);
        self.center_on(lat, lon);
    }

    /// Change zoom by `delta` levels, keeping the center fixed
    pub fn zoom_by(&mut self, delta: f32) {
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Re-center, clamping latitude and wrapping longitude
    pub fn center_on(&mut self, lat: f64, lon: f64) {
        self.center_lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        self.center_lon = (lon + 180.0).rem_euclid(360.0) - 180.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_world_corners() {
        assert!(close(WebMercator::lon_to_x(-180.0, 0.0), 0.0));
        assert!(close(WebMercator::lon_to_x(180.0, 0.0), TILE_SIZE));
        assert!(close(WebMercator::lat_to_y(0.0, 0.0), TILE_SIZE / 2.0));
        assert!(close(WebMercator::lat_to_y(0.0, 1.0), TILE_SIZE));
    }

    #[test]
    fn test_center_projects_to_origin() {
        let view = MapView::new(47.0, 2.0, 5.0);
        let (x, y) = view.project(47.0, 2.0);
        assert!(close(x, 0.0) && close(y, 0.0));
    }

    #[test]
    fn test_north_is_up_and_east_is_right() {
        let view = MapView::new(47.0, 2.0, 5.0);
        let (x, y) = view.project(50.0, 5.0);
        assert!(x > 0.0);
        assert!(y < 0.0);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let view = MapView::new(40.64, -73.78, 7.5);
        let (dx, dy) = view.project(33.94, -118.41);
        let (lat, lon) = view.unproject(dx, dy);
        assert!(close(lat, 33.94));
        assert!(close(lon, -118.41));
    }

    #[test]
    fn test_pan_round_trip() {
        let mut view = MapView::new(47.0, 2.0, 6.0);
        view.pan_pixels(120.0, -80.0);
        assert!(view.center_lon < 2.0);
        assert!(view.center_lat < 47.0);

        view.pan_pixels(-120.0, 80.0);
        assert!(close(view.center_lat, 47.0));
        assert!(close(view.center_lon, 2.0));
    }

    #[test]
    fn test_zoom_and_center_limits() {
        let mut view = MapView::new(89.0, 190.0, 20.0);
        assert_eq!(view.zoom, MAX_ZOOM);
        assert!(close(view.center_lat, MAX_LATITUDE));
        assert!(close(view.center_lon, -170.0));

        view.zoom_by(-50.0);
        assert_eq!(view.zoom, MIN_ZOOM);
    }
}
