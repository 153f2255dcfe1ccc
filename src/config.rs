use crate::domains::navigation::{GeoPoint, TrackingOptions, DEFAULT_ARRIVAL_THRESHOLD_M};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub proximity: ProximityConfig,
    pub map: MapConfig,
    pub routing: RoutingConfig,
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub max_stale_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityConfig {
    pub threshold_meters: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// `[lat, lng]`
    pub default_center: [f64; 2],
    pub default_zoom: u8,
    pub focus_zoom: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub base_url: String,
    pub profile: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub country_codes: Option<String>,
    pub limit: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub file: Option<String>,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if tokio::fs::try_exists(path.as_ref()).await? {
            Self::from_file(path).await
        } else {
            Ok(Self::default())
        }
    }
}

impl TrackingConfig {
    pub fn to_options(&self) -> TrackingOptions {
        TrackingOptions {
            high_accuracy: self.high_accuracy,
            timeout: Duration::from_millis(self.timeout_ms),
            max_stale: Duration::from_millis(self.max_stale_ms),
        }
    }
}

impl MapConfig {
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.default_center[0], self.default_center[1])
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracking: TrackingConfig {
                high_accuracy: true,
                timeout_ms: 10_000,
                max_stale_ms: 0,
            },
            proximity: ProximityConfig {
                threshold_meters: DEFAULT_ARRIVAL_THRESHOLD_M,
            },
            map: MapConfig {
                default_center: [-7.1654, -34.8631],
                default_zoom: 14,
                focus_zoom: 16,
            },
            routing: RoutingConfig {
                base_url: "https://api.openrouteservice.org".to_string(),
                profile: "driving-car".to_string(),
                api_key: None,
            },
            geocoder: GeocoderConfig {
                base_url: "https://nominatim.openstreetmap.org".to_string(),
                country_codes: Some("br".to_string()),
                limit: 5,
            },
            logging: LoggingConfig::default(),
        }
    }
}
