// src/map/canvas.rs
use std::f64::consts::PI;

use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Vec2};

use super::MapView;
use crate::analysis::Coordinates;
use crate::utils::{format_coordinates, is_valid_coordinates};

const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 19.0;
const MAX_LAT: f64 = 85.051_128_78;

const HOME: Coordinates = Coordinates { lat: 20.0, lng: 0.0 };
const HOME_ZOOM: f64 = 2.0;

const OCEAN: Color32 = Color32::from_rgb(0x12, 0x1c, 0x26);
const WORLD: Color32 = Color32::from_rgb(0x1e, 0x32, 0x24);
const GRID: Color32 = Color32::from_rgb(0x3a, 0x52, 0x44);
const AXIS: Color32 = Color32::from_rgb(0x7a, 0x9a, 0x86);
const MARKER: Color32 = Color32::from_rgb(0x3b, 0x82, 0xf6);

/// Web-Mercator world pixel position at `zoom`
pub fn project(coords: Coordinates, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lat = coords.lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    let x = (coords.lng + 180.0) / 360.0 * scale;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale;
    (x, y)
}

pub fn unproject(x: f64, y: f64, zoom: f64) -> Coordinates {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lng = x / scale * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y / scale);
    let lat = n.sinh().atan().to_degrees();
    Coordinates::new(lat, lng)
}

fn wrap_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

/// Graticule spacing in degrees that keeps lines at least `min_px` apart
pub fn grid_step(zoom: f64, min_px: f64) -> f64 {
    let px_per_degree = TILE_SIZE * 2f64.powf(zoom) / 360.0;
    const STEPS: [f64; 12] = [0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 15.0, 30.0, 60.0];
    STEPS.iter()
        .copied()
        .find(|step| step * px_per_degree >= min_px)
        .unwrap_or(60.0)
}

/// Minimal slippy-map surface: graticule, one marker, drag/scroll/click
#[derive(Debug, Clone)]
pub struct MapCanvas {
    center: Coordinates,
    zoom: f64,
    marker: Option<Coordinates>,
}

impl Default for MapCanvas {
    fn default() -> Self {
        Self {
            center: HOME,
            zoom: HOME_ZOOM,
            marker: None,
        }
    }
}

impl MapView for MapCanvas {
    fn pan_to(&mut self, coords: Coordinates) {
        self.center = Coordinates::new(coords.lat.clamp(-MAX_LAT, MAX_LAT), wrap_lng(coords.lng));
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn add_marker(&mut self, coords: Coordinates) {
        self.marker = Some(coords);
    }

    fn remove_marker(&mut self) {
        self.marker = None;
    }
}

impl MapCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn center(&self) -> Coordinates {
        self.center
    }

    #[cfg(test)]
    pub fn marker(&self) -> Option<Coordinates> {
        self.marker
    }

    pub fn reset_view(&mut self) {
        self.center = HOME;
        self.zoom = HOME_ZOOM;
    }

    fn screen_to_geo(&self, rect: Rect, pos: Pos2) -> Coordinates {
        let (cx, cy) = project(self.center, self.zoom);
        let x = cx + (pos.x - rect.center().x) as f64;
        let y = cy + (pos.y - rect.center().y) as f64;
        let c = unproject(x, y, self.zoom);
        Coordinates::new(c.lat, wrap_lng(c.lng))
    }

    fn geo_to_screen(&self, rect: Rect, coords: Coordinates) -> Pos2 {
        let (cx, cy) = project(self.center, self.zoom);
        let (x, y) = project(coords, self.zoom);
        rect.center() + Vec2::new((x - cx) as f32, (y - cy) as f32)
    }

    /// Zooms while keeping the point under `anchor` fixed on screen
    fn zoom_around(&mut self, rect: Rect, anchor: Pos2, delta: f64) {
        let before = self.screen_to_geo(rect, anchor);
        self.set_zoom(self.zoom + delta);
        let (ax, ay) = project(before, self.zoom);
        let offset = anchor - rect.center();
        let center = unproject(ax - offset.x as f64, ay - offset.y as f64, self.zoom);
        self.pan_to(center);
    }

    /// Draws the map and returns the point the user clicked, if any
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<Coordinates> {
        ui.horizontal(|ui| {
            if ui.small_button("➕").on_hover_text("Zoom in").clicked() {
                self.set_zoom(self.zoom + 1.0);
            }
            if ui.small_button("➖").on_hover_text("Zoom out").clicked() {
                self.set_zoom(self.zoom - 1.0);
            }
            if ui.small_button("🌍 World").clicked() {
                self.reset_view();
            }
            ui.label(format!("Zoom {:.1}", self.zoom));
        });

        let size = Vec2::new(ui.available_width(), ui.available_height().max(320.0));
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

        if response.dragged() {
            let delta = response.drag_delta();
            let (cx, cy) = project(self.center, self.zoom);
            self.pan_to(unproject(cx - delta.x as f64, cy - delta.y as f64, self.zoom));
        }

        if let Some(hover) = response.hover_pos() {
            let scroll = ui.input(|i| i.scroll_delta.y);
            if scroll != 0.0 {
                self.zoom_around(rect, hover, scroll as f64 / 100.0);
            }
        }

        let mut clicked = None;
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let coords = self.screen_to_geo(rect, pos);
                if is_valid_coordinates(&coords) {
                    clicked = Some(coords);
                }
            }
        }

        self.paint(ui, rect, response.hover_pos());
        clicked
    }

    fn paint(&self, ui: &egui::Ui, rect: Rect, hover: Option<Pos2>) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, OCEAN);

        let top_left = self.geo_to_screen(rect, Coordinates::new(MAX_LAT, -180.0));
        let bottom_right = self.geo_to_screen(rect, Coordinates::new(-MAX_LAT, 180.0));
        let world = Rect::from_min_max(top_left, bottom_right);
        painter.rect_filled(world.intersect(rect), 0.0, WORLD);

        let nw = self.screen_to_geo(rect, rect.left_top());
        let se = self.screen_to_geo(rect, rect.right_bottom());
        let step = grid_step(self.zoom, 80.0);
        let label_font = FontId::monospace(10.0);

        let decimals = if step >= 1.0 { 0 } else { (-step.log10()).ceil() as usize };

        // meridians
        let (cx, _) = project(self.center, self.zoom);
        let half_width = (rect.width() / 2.0) as f64;
        let lng_min = unproject(cx - half_width, 0.0, self.zoom).lng.max(-180.0);
        let lng_max = unproject(cx + half_width, 0.0, self.zoom).lng.min(180.0);
        for i in (lng_min / step).ceil() as i64..=(lng_max / step).floor() as i64 {
            let lng = i as f64 * step;
            let x = self.geo_to_screen(rect, Coordinates::new(0.0, lng)).x;
            if x < rect.left() || x > rect.right() {
                continue;
            }
            let color = if i == 0 { AXIS } else { GRID };
            painter.line_segment(
                [Pos2::new(x, world.top().max(rect.top())), Pos2::new(x, world.bottom().min(rect.bottom()))],
                Stroke::new(1.0, color),
            );
            painter.text(Pos2::new(x + 2.0, rect.top() + 2.0), Align2::LEFT_TOP, format!("{:.*}°", decimals, lng), label_font.clone(), AXIS);
        }

        // parallels
        let lat_min = se.lat.max(-MAX_LAT);
        let lat_max = nw.lat.min(MAX_LAT);
        for i in (lat_min / step).ceil() as i64..=(lat_max / step).floor() as i64 {
            let lat = i as f64 * step;
            let y = self.geo_to_screen(rect, Coordinates::new(lat, self.center.lng)).y;
            let color = if i == 0 { AXIS } else { GRID };
            painter.line_segment(
                [Pos2::new(world.left().max(rect.left()), y), Pos2::new(world.right().min(rect.right()), y)],
                Stroke::new(1.0, color),
            );
            painter.text(Pos2::new(rect.left() + 2.0, y - 2.0), Align2::LEFT_BOTTOM, format!("{:.*}°", decimals, lat), label_font.clone(), AXIS);
        }

        if let Some(marker) = self.marker {
            let pos = self.geo_to_screen(rect, marker);
            if rect.contains(pos) {
                painter.circle(pos, 8.0, MARKER, Stroke::new(2.0, Color32::WHITE));
            }
        }

        let readout = match hover {
            Some(pos) => format_coordinates(&self.screen_to_geo(rect, pos)),
            None => format_coordinates(&self.center),
        };
        painter.text(
            rect.left_bottom() + Vec2::new(6.0, -6.0),
            Align2::LEFT_BOTTOM,
            readout,
            FontId::monospace(12.0),
            Color32::WHITE,
        );
        painter.text(
            rect.right_bottom() + Vec2::new(-6.0, -6.0),
            Align2::RIGHT_BOTTOM,
            "Drag to pan · scroll to zoom · click to select",
            FontId::proportional(11.0),
            AXIS,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_world_center() {
        let (x, y) = project(Coordinates::new(0.0, 0.0), 0.0);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn unproject_inverts_project() {
        let p = Coordinates::new(-33.87, 151.21);
        let (x, y) = project(p, 12.0);
        let back = unproject(x, y, 12.0);
        assert!((back.lat - p.lat).abs() < 1e-9);
        assert!((back.lng - p.lng).abs() < 1e-9);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut map = MapCanvas::new();
        map.set_zoom(40.0);
        assert_eq!(map.zoom(), MAX_ZOOM);
        map.set_zoom(-3.0);
        assert_eq!(map.zoom(), MIN_ZOOM);
    }

    #[test]
    fn pan_wraps_longitude_and_clamps_latitude() {
        let mut map = MapCanvas::new();
        map.pan_to(Coordinates::new(89.0, 190.0));
        assert!((map.center().lng - -170.0).abs() < 1e-9);
        assert!((map.center().lat - MAX_LAT).abs() < 1e-9);
    }

    #[test]
    fn grid_gets_finer_when_zoomed_in() {
        assert_eq!(grid_step(2.0, 80.0), 30.0);
        assert!(grid_step(12.0, 80.0) < 0.1);
    }

    #[test]
    fn starts_on_global_view() {
        let map = MapCanvas::new();
        assert_eq!(map.center(), Coordinates::new(20.0, 0.0));
        assert_eq!(map.zoom(), 2.0);
        assert_eq!(map.marker(), None);
    }
}
