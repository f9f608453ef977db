// src/config/mod.rs
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, Context};
use ::config::{Config, Environment, File};
use serde::{Serialize, Deserialize};
use tracing::{info, warn};

use crate::analysis::{ImageProducer, MockProducer, RemoteProducer};
use crate::map::{Geocoder, NominatimGeocoder};

pub const APP_NAME: &str = "satvision";
const CONFIG_FILE: &str = "satvision.toml";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ProducerKind {
    Mock,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub producer: ProducerKind,
    pub endpoint: String,
    pub geocoder_url: String,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    pub mock_delay_min_ms: u64,
    pub mock_delay_max_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            producer: ProducerKind::Mock,
            endpoint: "http://localhost:5001/api/detect-change".to_string(),
            geocoder_url: "https://nominatim.openstreetmap.org/search".to_string(),
            data_dir: None,
            mock_delay_min_ms: 2000,
            mock_delay_max_ms: 4000,
            request_timeout_secs: 120,
        }
    }
}

impl AppConfig {
    /// Platform config dir, then the working directory, then `SATVISION_*` variables
    pub fn load() -> Self {
        let mut files = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            files.push(dir.join(APP_NAME).join(CONFIG_FILE));
        }
        files.push(PathBuf::from(CONFIG_FILE));

        match Self::load_from(&files, true) {
            Ok(config) => config,
            Err(e) => {
                warn!("Invalid configuration, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(files: &[PathBuf], with_env: bool) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("producer", "mock")?
            .set_default("endpoint", defaults.endpoint)?
            .set_default("geocoder_url", defaults.geocoder_url)?
            .set_default("mock_delay_min_ms", defaults.mock_delay_min_ms as i64)?
            .set_default("mock_delay_max_ms", defaults.mock_delay_max_ms as i64)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?;

        for path in files {
            builder = builder.add_source(File::from(path.as_path()).required(false));
        }
        if with_env {
            builder = builder.add_source(Environment::with_prefix("SATVISION"));
        }

        builder.build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone()
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_NAME)))
            .unwrap_or_else(|| Path::new(".").join(format!(".{}", APP_NAME)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn build_producer(&self) -> Result<Arc<dyn ImageProducer>> {
        let producer: Arc<dyn ImageProducer> = match self.producer {
            ProducerKind::Mock => Arc::new(MockProducer::new(
                Duration::from_millis(self.mock_delay_min_ms),
                Duration::from_millis(self.mock_delay_max_ms),
            )),
            ProducerKind::Remote => Arc::new(
                RemoteProducer::new(&self.endpoint, self.request_timeout())
                    .context("Failed to set up HTTP client")?,
            ),
        };
        info!(producer = ?self.producer, endpoint = %self.endpoint, "image producer ready");
        Ok(producer)
    }

    pub fn build_geocoder(&self) -> Result<Arc<dyn Geocoder>> {
        let geocoder = NominatimGeocoder::new(&self.geocoder_url, Duration::from_secs(15))
            .context("Failed to set up geocoder")?;
        Ok(Arc::new(geocoder))
    }
}
