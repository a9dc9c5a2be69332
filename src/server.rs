//! HTTP map server. Feeds the Leaflet frontend: styled region GeoJSON, the
//! marker list, a point-in-region lookup, and the two panels' selection
//! state. Also serves the static page and the pre-rendered overlay tiles.

use crate::config::{AppConfig, MapConfig};
use crate::dataset::Dataset;
use crate::index::{build_index, locate, RegionIndex};
use crate::panel::{MarkerPanel, MarkerPopup, RegionPanel, RegionPopup};
use crate::types::{EventMarker, Region};
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use rstar::RTree;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

pub struct AppState {
    pub regions: Vec<Region>,
    pub tree: RTree<RegionIndex>,
    pub config: AppConfig,
    // Each panel owns its selection cell; the two are never held together.
    pub marker_panel: Mutex<MarkerPanel>,
    pub region_panel: Mutex<RegionPanel>,
}

impl AppState {
    pub fn new(config: AppConfig, dataset: Dataset, regions: Vec<Region>) -> Self {
        let tree = build_index(&regions);
        let region_names = regions.iter().map(|r| r.name.clone());
        AppState {
            marker_panel: Mutex::new(MarkerPanel::new(dataset.markers)),
            region_panel: Mutex::new(RegionPanel::new(region_names, dataset.densities)),
            regions,
            tree,
            config,
        }
    }
}

#[derive(Deserialize)]
pub struct QueryParams {
    lat: f64,
    lon: f64,
}

/// View of a panel's selection state, polled by the frontend.
#[derive(Serialize)]
pub struct PanelView<P: Serialize> {
    pub selected: bool,
    pub popup: Option<P>,
}

pub async fn start_server(config: AppConfig, dataset: Dataset, regions: Vec<Region>) -> Result<()> {
    info!(regions = regions.len(), "building spatial index");
    let port = config.server.port;
    let static_dir = config.server.static_dir.clone();
    let tile_dir = config.output.tile_dir.clone();
    let state = Arc::new(AppState::new(config, dataset, regions));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("starting server on http://{}", addr);

    let app = Router::new()
        .route("/api/config", get(config_handler))
        .route("/api/regions", get(regions_handler))
        .route("/api/markers", get(markers_handler))
        .route("/api/query", get(query_handler))
        .route("/api/panel/markers", get(marker_panel_handler))
        .route("/api/panel/markers/click/:id", post(marker_click_handler))
        .route("/api/panel/markers/close", post(marker_close_handler))
        .route("/api/panel/regions", get(region_panel_handler))
        .route("/api/panel/regions/click/:name", post(region_click_handler))
        .route("/api/panel/regions/close", post(region_close_handler))
        .nest_service("/tiles", ServeDir::new(tile_dir))
        .nest_service("/", ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub async fn config_handler(State(state): State<Arc<AppState>>) -> Json<MapConfig> {
    Json(state.config.map.clone())
}

/// GeoJSON FeatureCollection of the filtered regions, each carrying its
/// density (null when unknown) and resolved bucket fill.
pub async fn regions_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let panel = state.region_panel.lock().unwrap();
    let features: Vec<Value> = state
        .regions
        .iter()
        .map(|region| {
            let geometry = geojson::Value::from(&region.geometry);
            let mut properties = Map::new();
            properties.insert("name".to_string(), json!(region.name));
            properties.insert("density".to_string(), json!(panel.density(&region.name)));
            properties.insert("style".to_string(), json!(panel.style(&region.name)));
            properties.insert(
                "hoverStyle".to_string(),
                json!(panel.hover_style(&region.name)),
            );
            json!({
                "type": "Feature",
                "geometry": geojson::Geometry::new(geometry),
                "properties": properties,
            })
        })
        .collect();

    Json(json!({
        "type": "FeatureCollection",
        "features": features,
    }))
}

pub async fn markers_handler(State(state): State<Arc<AppState>>) -> Json<Vec<EventMarker>> {
    let panel = state.marker_panel.lock().unwrap();
    Json(panel.markers().to_vec())
}

/// Point-in-region lookup. Returns the popup view for the containing
/// region, or null over open water / outside the fifty states.
pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Json<Option<RegionPopup>> {
    let found = locate(&state.regions, &state.tree, params.lon, params.lat);
    let popup = found.map(|region| {
        let panel = state.region_panel.lock().unwrap();
        panel.popup_for(&region.name)
    });
    Json(popup)
}

pub async fn marker_panel_handler(
    State(state): State<Arc<AppState>>,
) -> Json<PanelView<MarkerPopup>> {
    let panel = state.marker_panel.lock().unwrap();
    Json(PanelView {
        selected: panel.selected().is_some(),
        popup: panel.popup(),
    })
}

pub async fn marker_click_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Json<PanelView<MarkerPopup>> {
    let mut panel = state.marker_panel.lock().unwrap();
    panel.click(id);
    Json(PanelView {
        selected: panel.selected().is_some(),
        popup: panel.popup(),
    })
}

pub async fn marker_close_handler(
    State(state): State<Arc<AppState>>,
) -> Json<PanelView<MarkerPopup>> {
    let mut panel = state.marker_panel.lock().unwrap();
    panel.close();
    Json(PanelView {
        selected: false,
        popup: None,
    })
}

pub async fn region_panel_handler(
    State(state): State<Arc<AppState>>,
) -> Json<PanelView<RegionPopup>> {
    let panel = state.region_panel.lock().unwrap();
    Json(PanelView {
        selected: panel.selected().is_some(),
        popup: panel.popup(),
    })
}

pub async fn region_click_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Json<PanelView<RegionPopup>> {
    let mut panel = state.region_panel.lock().unwrap();
    panel.click(&name);
    Json(PanelView {
        selected: panel.selected().is_some(),
        popup: panel.popup(),
    })
}

pub async fn region_close_handler(
    State(state): State<Arc<AppState>>,
) -> Json<PanelView<RegionPopup>> {
    let mut panel = state.region_panel.lock().unwrap();
    panel.close();
    Json(PanelView {
        selected: false,
        popup: None,
    })
}
