// src/map/mod.rs
use tracing::debug;

use crate::analysis::{Coordinates, Selection};

pub mod canvas;
pub mod search;

pub use canvas::MapCanvas;
pub use search::{Geocoder, NominatimGeocoder, Place, SearchBox};

/// Below this zoom a new selection is brought closer
pub const MIN_DETAIL_ZOOM: f64 = 10.0;
pub const INSPECTION_ZOOM: f64 = 12.0;

/// Imperative handle onto whatever map widget is on screen
pub trait MapView {
    fn pan_to(&mut self, coords: Coordinates);
    fn set_zoom(&mut self, zoom: f64);
    fn zoom(&self) -> f64;
    fn add_marker(&mut self, coords: Coordinates);
    fn remove_marker(&mut self);
}

/// Turns map clicks and search picks into one kind of selection
#[derive(Debug, Default)]
pub struct LocationPicker;

impl LocationPicker {
    pub fn new() -> Self {
        Self
    }

    /// Raw click; the address falls back to the coordinate pair
    pub fn on_map_click(&self, map: &mut dyn MapView, lat: f64, lng: f64) -> Selection {
        let selection = Selection::new(Coordinates::new(lat, lng), None);
        debug!(lat, lng, "map click");
        self.focus(map, selection.coords);
        selection
    }

    pub fn on_place_selected(&self, map: &mut dyn MapView, coords: Coordinates, display_name: &str) -> Selection {
        let selection = Selection::new(coords, Some(display_name.to_string()));
        debug!(address = %selection.address, "place selected");
        self.focus(map, selection.coords);
        selection
    }

    /// Single marker on the point, centered, zoomed in if currently too far out
    pub fn focus(&self, map: &mut dyn MapView, coords: Coordinates) {
        map.remove_marker();
        map.add_marker(coords);
        map.pan_to(coords);
        if map.zoom() < MIN_DETAIL_ZOOM {
            map.set_zoom(INSPECTION_ZOOM);
        }
    }
}
