// src/analysis/types.rs
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// The persisted outcome of one change-detection run.
///
/// Field names follow the `analysisHistory` JSON layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub image_url: String,
    pub location: Coordinates,
    pub timestamp: String,
    pub analysis_id: String,
    pub address: String,
}

impl AnalysisResult {
    /// File name offered when the user saves the image
    pub fn download_name(&self) -> String {
        let ext = std::path::Path::new(&self.image_url)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");
        format!("change-detection-{}.{}", self.analysis_id, ext)
    }
}

/// The user-chosen point plus its display address
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub coords: Coordinates,
    pub address: String,
}

impl Selection {
    /// Falls back to the four-decimal coordinate pair when no address is known
    pub fn new(coords: Coordinates, address: Option<String>) -> Self {
        let address = address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| crate::utils::short_coordinates(&coords));
        Self { coords, address }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_uses_camel_case_keys() {
        let result = AnalysisResult {
            image_url: "/tmp/a.jpg".into(),
            location: Coordinates::new(10.0, 20.0),
            timestamp: "2024-06-15T10:00:00.000Z".into(),
            analysis_id: "analysis_1718445600000".into(),
            address: "Somewhere".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["imageUrl"], "/tmp/a.jpg");
        assert_eq!(json["analysisId"], "analysis_1718445600000");
        assert_eq!(json["location"]["lng"], 20.0);
    }

    #[test]
    fn reads_browser_history_entry() {
        let raw = r#"{"imageUrl":"blob:x","location":{"lat":1.5,"lng":-2.5},
            "timestamp":"2024-01-01T00:00:00.000Z","analysisId":"analysis_1","address":"A"}"#;
        let result: AnalysisResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.location, Coordinates::new(1.5, -2.5));
        assert_eq!(result.address, "A");
    }

    #[test]
    fn download_name_keeps_extension() {
        let mut result = AnalysisResult {
            image_url: "/data/images/analysis_7.png".into(),
            location: Coordinates::new(0.0, 0.0),
            timestamp: String::new(),
            analysis_id: "analysis_7".into(),
            address: String::new(),
        };
        assert_eq!(result.download_name(), "change-detection-analysis_7.png");
        result.image_url = "no-extension".into();
        assert_eq!(result.download_name(), "change-detection-analysis_7.jpg");
    }

    #[test]
    fn selection_falls_back_to_coordinates() {
        let s = Selection::new(Coordinates::new(10.0, 20.0), None);
        assert_eq!(s.address, "10.0000, 20.0000");
        let s = Selection::new(Coordinates::new(10.0, 20.0), Some("  ".into()));
        assert_eq!(s.address, "10.0000, 20.0000");
        let s = Selection::new(Coordinates::new(10.0, 20.0), Some("Cairo".into()));
        assert_eq!(s.address, "Cairo");
    }
}
