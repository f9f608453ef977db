// src/map/search.rs
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Result, Context, anyhow};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::analysis::Coordinates;
use crate::utils::is_valid_coordinates;

const USER_AGENT: &str = concat!("satvision/", env!("CARGO_PKG_VERSION"));
const RESULT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub display_name: String,
    pub coords: Coordinates,
}

pub trait Geocoder: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<Place>>;
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    display_name: String,
    lat: String,
    lon: String,
}

/// Forward geocoding against a Nominatim-compatible `search` endpoint
pub struct NominatimGeocoder {
    url: String,
    client: reqwest::blocking::Client,
}

impl NominatimGeocoder {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { url: url.into(), client })
    }
}

impl Geocoder for NominatimGeocoder {
    fn search(&self, query: &str) -> Result<Vec<Place>> {
        if let Some(coords) = parse_coordinates(query) {
            return Ok(vec![Place { display_name: query.trim().to_string(), coords }]);
        }

        let limit = RESULT_LIMIT.to_string();
        let response = self.client
            .get(&self.url)
            .query(&[("q", query), ("format", "json"), ("limit", limit.as_str())])
            .send()
            .context("Search request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("Search service returned {}", response.status()));
        }

        let hits: Vec<NominatimHit> = response.json()
            .context("Unexpected search response")?;
        Ok(places_from_hits(hits))
    }
}

fn places_from_hits(hits: Vec<NominatimHit>) -> Vec<Place> {
    hits.into_iter()
        .filter_map(|hit| {
            let lat = hit.lat.parse().ok()?;
            let lng = hit.lon.parse().ok()?;
            let coords = Coordinates::new(lat, lng);
            is_valid_coordinates(&coords).then_some(Place { display_name: hit.display_name, coords })
        })
        .collect()
}

/// Accepts `"lat, lng"` or `"lat lng"` inside the valid range
pub fn parse_coordinates(text: &str) -> Option<Coordinates> {
    let mut parts = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    let lat = parts.next()?.parse::<f64>().ok()?;
    let lng = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let coords = Coordinates::new(lat, lng);
    is_valid_coordinates(&coords).then_some(coords)
}

/// Search box state with one background lookup at a time
pub struct SearchBox {
    geocoder: Arc<dyn Geocoder>,
    pub query: String,
    results: Vec<Place>,
    error: Option<String>,
    pending: Option<Receiver<Result<Vec<Place>>>>,
}

impl SearchBox {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            geocoder,
            query: String::new(),
            results: Vec::new(),
            error: None,
            pending: None,
        }
    }

    pub fn is_searching(&self) -> bool {
        self.pending.is_some()
    }

    pub fn results(&self) -> &[Place] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn submit(&mut self) {
        let query = self.query.trim().to_string();
        if query.is_empty() || self.pending.is_some() {
            return;
        }
        debug!(%query, "searching");

        self.error = None;
        self.results.clear();

        let (tx, rx) = mpsc::channel();
        let geocoder = Arc::clone(&self.geocoder);
        thread::spawn(move || {
            let _ = tx.send(geocoder.search(&query));
        });
        self.pending = Some(rx);
    }

    /// Collects a finished lookup; returns true when results changed
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(anyhow!("search stopped unexpectedly")),
        };
        self.pending = None;

        match outcome {
            Ok(places) if places.is_empty() => {
                self.error = Some(format!("No results for \"{}\"", self.query.trim()));
            }
            Ok(places) => self.results = places,
            Err(e) => {
                warn!("Location search failed: {:#}", e);
                self.error = Some(format!("{:#}", e));
            }
        }
        true
    }

    /// Takes the picked place and resets the result list
    pub fn pick(&mut self, index: usize) -> Option<Place> {
        if index >= self.results.len() {
            return None;
        }
        let place = self.results.swap_remove(index);
        self.results.clear();
        self.query = place.display_name.clone();
        Some(place)
    }

    pub fn dismiss(&mut self) {
        self.results.clear();
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    struct FixedGeocoder(Vec<Place>);

    impl Geocoder for FixedGeocoder {
        fn search(&self, _query: &str) -> Result<Vec<Place>> {
            Ok(self.0.clone())
        }
    }

    struct DownGeocoder;

    impl Geocoder for DownGeocoder {
        fn search(&self, _query: &str) -> Result<Vec<Place>> {
            Err(anyhow!("service unavailable"))
        }
    }

    fn wait(search: &mut SearchBox) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !search.poll() {
            assert!(Instant::now() < deadline, "search never finished");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn cairo() -> Place {
        Place { display_name: "Cairo, Egypt".into(), coords: Coordinates::new(30.04, 31.24) }
    }

    #[test]
    fn parses_coordinate_queries() {
        assert_eq!(parse_coordinates("10, 20"), Some(Coordinates::new(10.0, 20.0)));
        assert_eq!(parse_coordinates(" -33.87 151.21 "), Some(Coordinates::new(-33.87, 151.21)));
        assert_eq!(parse_coordinates("91, 0"), None);
        assert_eq!(parse_coordinates("Paris"), None);
        assert_eq!(parse_coordinates("1, 2, 3"), None);
    }

    #[test]
    fn nominatim_hits_are_converted() {
        let hits: Vec<NominatimHit> = serde_json::from_str(
            r#"[{"display_name":"Cairo, Egypt","lat":"30.04","lon":"31.24","importance":0.9},
                {"display_name":"Broken","lat":"abc","lon":"1"}]"#,
        ).unwrap();
        assert_eq!(places_from_hits(hits), vec![cairo()]);
    }

    #[test]
    fn coordinate_query_skips_network() {
        let geocoder = NominatimGeocoder::new("http://127.0.0.1:9/unused", Duration::from_secs(1)).unwrap();
        let places = geocoder.search("10, 20").unwrap();
        assert_eq!(places[0].coords, Coordinates::new(10.0, 20.0));
    }

    #[test]
    fn search_box_collects_and_picks() {
        let mut search = SearchBox::new(Arc::new(FixedGeocoder(vec![cairo()])));
        search.query = "cairo".into();
        search.submit();
        assert!(search.is_searching());
        wait(&mut search);

        assert_eq!(search.results(), &[cairo()]);
        assert_eq!(search.pick(0), Some(cairo()));
        assert!(search.results().is_empty());
        assert_eq!(search.query, "Cairo, Egypt");
        assert_eq!(search.pick(0), None);
    }

    #[test]
    fn empty_results_and_failures_report_errors() {
        let mut search = SearchBox::new(Arc::new(FixedGeocoder(Vec::new())));
        search.query = "nowhere".into();
        search.submit();
        wait(&mut search);
        assert_eq!(search.error(), Some("No results for \"nowhere\""));

        let mut search = SearchBox::new(Arc::new(DownGeocoder));
        search.query = "x".into();
        search.submit();
        wait(&mut search);
        assert_eq!(search.error(), Some("service unavailable"));
        assert!(!search.is_searching());
    }

    #[test]
    fn blank_query_is_ignored() {
        let mut search = SearchBox::new(Arc::new(DownGeocoder));
        search.query = "   ".into();
        search.submit();
        assert!(!search.is_searching());
    }
}
