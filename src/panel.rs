//! The two map panels and their selection state.
//!
//! Each panel owns exactly one optional selection: the event map tracks a
//! marker id, the choropleth tracks a region name. The two cells are fully
//! independent. Clicking while something is already selected moves straight
//! to the new selection; closing the popup clears it.

use crate::palette::color_for;
use crate::types::{EventMarker, RegionStyle};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Popup content for the currently selected event marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPopup {
    pub id: u32,
    pub name: String,
    pub description: String,
}

/// Popup content for the currently selected region. `density_label` is the
/// display string: the numeric density, or "N/A" when the region is missing
/// from the density table. The fill still comes from the color buckets, so
/// an unknown region shows the lightest tier next to an "N/A" label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPopup {
    pub name: String,
    pub density: Option<f64>,
    pub density_label: String,
    pub fill: &'static str,
}

pub struct MarkerPanel {
    markers: Vec<EventMarker>,
    selected: Option<u32>,
}

impl MarkerPanel {
    pub fn new(markers: Vec<EventMarker>) -> Self {
        MarkerPanel {
            markers,
            selected: None,
        }
    }

    pub fn markers(&self) -> &[EventMarker] {
        &self.markers
    }

    /// Click on a marker. Unknown ids leave the selection untouched.
    pub fn click(&mut self, id: u32) -> bool {
        if self.markers.iter().any(|m| m.id == id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    pub fn popup(&self) -> Option<MarkerPopup> {
        let id = self.selected?;
        let marker = self.markers.iter().find(|m| m.id == id)?;
        Some(MarkerPopup {
            id: marker.id,
            name: marker.name.clone(),
            description: marker.description.clone(),
        })
    }
}

pub struct RegionPanel {
    names: HashSet<String>,
    densities: HashMap<String, f64>,
    selected: Option<String>,
}

impl RegionPanel {
    pub fn new(region_names: impl IntoIterator<Item = String>, densities: HashMap<String, f64>) -> Self {
        RegionPanel {
            names: region_names.into_iter().collect(),
            densities,
            selected: None,
        }
    }

    pub fn density(&self, name: &str) -> Option<f64> {
        self.densities.get(name).copied()
    }

    /// Base style: bucket fill behind a white dashed border.
    pub fn style(&self, name: &str) -> RegionStyle {
        RegionStyle {
            fill_color: color_for(self.density(name)),
            color: "white",
            weight: 2.0,
            opacity: 1.0,
            dash_array: Some("3"),
            fill_opacity: 0.7,
        }
    }

    /// Hover style: thicker grey border, darker fill. Mouse-out reverts to
    /// `style`.
    pub fn hover_style(&self, name: &str) -> RegionStyle {
        RegionStyle {
            fill_color: color_for(self.density(name)),
            color: "#666",
            weight: 3.0,
            opacity: 1.0,
            dash_array: None,
            fill_opacity: 0.9,
        }
    }

    /// Click on a region. Names outside the rendered set are ignored.
    pub fn click(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            self.selected = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn popup(&self) -> Option<RegionPopup> {
        let name = self.selected.clone()?;
        Some(self.popup_for(&name))
    }

    /// Popup content for an arbitrary region, also used by the point-lookup
    /// API which does not touch the selection.
    pub fn popup_for(&self, name: &str) -> RegionPopup {
        let density = self.density(name);
        RegionPopup {
            name: name.to_string(),
            density,
            density_label: match density {
                Some(d) => format!("{}", d),
                None => "N/A".to_string(),
            },
            fill: color_for(density),
        }
    }
}
