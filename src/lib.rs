//! US state population density map: a TopoJSON boundary loader, a
//! six-bucket density palette, two map panels with independent selection
//! state, a choropleth tile renderer, and the axum server tying them to a
//! Leaflet frontend.

pub mod config;
pub mod dataset;
pub mod index;
pub mod palette;
pub mod panel;
pub mod render;
pub mod server;
pub mod topology;
pub mod types;
