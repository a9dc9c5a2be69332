use geo::MultiPolygon;
use serde::Serialize;

/// One state boundary from the topology file. Loaded once at startup,
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// A fixed event marker shown on the event map.
#[derive(Debug, Clone, Serialize)]
pub struct EventMarker {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
}

/// Leaflet path options for a region polygon. Serialized camelCase so the
/// frontend can pass them straight through to L.geoJSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStyle {
    pub fill_color: &'static str,
    pub color: &'static str,
    pub weight: f32,
    pub opacity: f32,
    pub dash_array: Option<&'static str>,
    pub fill_opacity: f32,
}
