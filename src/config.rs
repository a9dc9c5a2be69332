use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub map: MapConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// TopoJSON document holding the state boundaries.
    pub topology: PathBuf,
    /// Geometry object to read from `objects`; all objects when unset.
    pub object: Option<String>,
    /// Property carrying the region name.
    #[serde(default = "default_name_property")]
    pub name_property: String,
}

/// Settings the Leaflet page reads over `/api/config`. Everything here is a
/// rendering asset reference; nothing is fetched server-side.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MapConfig {
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
    #[serde(default = "default_attribution")]
    pub attribution: String,
    #[serde(default = "default_marker_icon_url")]
    pub marker_icon_url: String,
    #[serde(default = "default_marker_shadow_url")]
    pub marker_shadow_url: String,
    /// [lat, lng] center for the event map (Washington DC).
    #[serde(default = "default_event_center")]
    pub event_center: [f64; 2],
    #[serde(default = "default_event_zoom")]
    pub event_zoom: u8,
    /// [lat, lng] center for the choropleth map (continental US).
    #[serde(default = "default_region_center")]
    pub region_center: [f64; 2],
    #[serde(default = "default_region_zoom")]
    pub region_zoom: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub tile_dir: PathBuf,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_name_property() -> String {
    "name".to_string()
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_attribution() -> String {
    "&copy; OpenStreetMap contributors".to_string()
}

fn default_marker_icon_url() -> String {
    "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-2x-blue.png"
        .to_string()
}

fn default_marker_shadow_url() -> String {
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/images/marker-shadow.png"
        .to_string()
}

fn default_event_center() -> [f64; 2] {
    [38.9072, -77.0369]
}

fn default_event_zoom() -> u8 {
    12
}

fn default_region_center() -> [f64; 2] {
    [37.8, -96.0]
}

fn default_region_zoom() -> u8 {
    4
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            tile_url: default_tile_url(),
            attribution: default_attribution(),
            marker_icon_url: default_marker_icon_url(),
            marker_shadow_url: default_marker_shadow_url(),
            event_center: default_event_center(),
            event_zoom: default_event_zoom(),
            region_center: default_region_center(),
            region_zoom: default_region_zoom(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [input]
            topology = "data/us-states.topo.json"

            [output]
            tile_dir = "tiles"
            min_zoom = 3
            max_zoom = 6

            [server]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.input.name_property, "name");
        assert!(config.map.tile_url.contains("tile.openstreetmap.org"));
        assert_eq!(config.map.event_center, [38.9072, -77.0369]);
        assert_eq!(config.server.static_dir, PathBuf::from("static"));
    }
}
