//! Built-in datasets: the fifty-state allowlist, the population density
//! table, and the Washington DC event markers.
//!
//! These are constructed once and handed to the panels and the server as
//! plain values, so tests can substitute their own tables.

use crate::types::EventMarker;
use std::collections::HashMap;

/// The fifty addressed state names. Boundary features whose name is not in
/// this list (territories, districts) are dropped at load time.
pub const STATE_NAMES: [&str; 50] = [
    "Alabama", "Alaska", "Arizona", "Arkansas", "California", "Colorado",
    "Connecticut", "Delaware", "Florida", "Georgia", "Hawaii", "Idaho",
    "Illinois", "Indiana", "Iowa", "Kansas", "Kentucky", "Louisiana",
    "Maine", "Maryland", "Massachusetts", "Michigan", "Minnesota",
    "Mississippi", "Missouri", "Montana", "Nebraska", "Nevada",
    "New Hampshire", "New Jersey", "New Mexico", "New York",
    "North Carolina", "North Dakota", "Ohio", "Oklahoma", "Oregon",
    "Pennsylvania", "Rhode Island", "South Carolina", "South Dakota",
    "Tennessee", "Texas", "Utah", "Vermont", "Virginia", "Washington",
    "West Virginia", "Wisconsin", "Wyoming",
];

/// Static lookup tables feeding the two map panels.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// State name -> people per square mile.
    pub densities: HashMap<String, f64>,
    pub markers: Vec<EventMarker>,
}

impl Dataset {
    pub fn builtin() -> Self {
        Dataset {
            densities: builtin_densities(),
            markers: builtin_markers(),
        }
    }
}

fn builtin_densities() -> HashMap<String, f64> {
    // People per square mile, 2020-ish figures.
    let table: [(&str, f64); 50] = [
        ("Alabama", 96.0),
        ("Alaska", 1.3),
        ("Arizona", 64.0),
        ("Arkansas", 58.0),
        ("California", 253.0),
        ("Colorado", 57.0),
        ("Connecticut", 741.0),
        ("Delaware", 500.0),
        ("Florida", 397.0),
        ("Georgia", 184.0),
        ("Hawaii", 214.0),
        ("Idaho", 22.0),
        ("Illinois", 231.0),
        ("Indiana", 184.0),
        ("Iowa", 56.0),
        ("Kansas", 36.0),
        ("Kentucky", 110.0),
        ("Louisiana", 108.0),
        ("Maine", 43.0),
        ("Maryland", 626.0),
        ("Massachusetts", 884.0),
        ("Michigan", 174.0),
        ("Minnesota", 71.0),
        ("Mississippi", 63.0),
        ("Missouri", 89.0),
        ("Montana", 6.86),
        ("Nebraska", 25.0),
        ("Nevada", 28.0),
        ("New Hampshire", 153.0),
        ("New Jersey", 1212.0),
        ("New Mexico", 17.0),
        ("New York", 417.0),
        ("North Carolina", 213.0),
        ("North Dakota", 11.0),
        ("Ohio", 286.0),
        ("Oklahoma", 58.0),
        ("Oregon", 44.0),
        ("Pennsylvania", 286.0),
        ("Rhode Island", 1021.0),
        ("South Carolina", 170.0),
        ("South Dakota", 12.0),
        ("Tennessee", 169.0),
        ("Texas", 108.0),
        ("Utah", 39.0),
        ("Vermont", 68.0),
        ("Virginia", 216.0),
        ("Washington", 117.0),
        ("West Virginia", 77.0),
        ("Wisconsin", 107.0),
        ("Wyoming", 6.0),
    ];
    table
        .into_iter()
        .map(|(name, d)| (name.to_string(), d))
        .collect()
}

fn builtin_markers() -> Vec<EventMarker> {
    vec![
        EventMarker {
            id: 1,
            name: "Muhsinah".to_string(),
            description: "Jazz-influenced hip hop artist Muhsinah performing live."
                .to_string(),
            lat: 38.917,
            lng: -77.032,
        },
        EventMarker {
            id: 2,
            name: "Show 2".to_string(),
            description: "Another event happening in Washington DC.".to_string(),
            lat: 38.895,
            lng: -77.07,
        },
        EventMarker {
            id: 3,
            name: "Show 3".to_string(),
            description: "Live performance downtown.".to_string(),
            lat: 38.89,
            lng: -77.02,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_table_covers_all_fifty_states() {
        let ds = Dataset::builtin();
        assert_eq!(ds.densities.len(), 50);
        for name in STATE_NAMES {
            assert!(ds.densities.contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn test_marker_one_is_muhsinah() {
        let ds = Dataset::builtin();
        assert_eq!(ds.markers.len(), 3);
        let first = ds.markers.iter().find(|m| m.id == 1).unwrap();
        assert_eq!(first.name, "Muhsinah");
    }
}
