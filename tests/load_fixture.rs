//! End-to-end: load a small topology fixture, wire it into the panels and
//! the spatial index, and walk the selection flows.

use statemap::config::InputConfig;
use statemap::dataset::{Dataset, STATE_NAMES};
use statemap::index::{build_index, locate};
use statemap::panel::{MarkerPanel, RegionPanel};
use statemap::topology::load_regions;
use std::path::PathBuf;

fn fixture_input() -> InputConfig {
    InputConfig {
        topology: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures/states.topo.json"),
        object: Some("states".to_string()),
        name_property: "name".to_string(),
    }
}

#[test]
fn loads_only_allowlisted_regions() {
    let regions = load_regions(&fixture_input(), &STATE_NAMES).unwrap();
    // The fixture holds California, Texas and Puerto Rico; only the two
    // states survive the allowlist.
    let names: Vec<&str> = regions.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["California", "Texas"]);
}

#[test]
fn missing_topology_file_is_fatal() {
    let mut input = fixture_input();
    input.topology = PathBuf::from("no/such/file.json");
    let err = load_regions(&input, &STATE_NAMES).unwrap_err();
    assert!(err.to_string().contains("Failed to open topology file"));
}

#[test]
fn point_lookup_hits_decoded_polygons() {
    let regions = load_regions(&fixture_input(), &STATE_NAMES).unwrap();
    let tree = build_index(&regions);

    // Inside the fixture's California square (-110..-100, 30..40).
    assert_eq!(locate(&regions, &tree, -105.0, 35.0).unwrap().name, "California");
    // Inside the Texas square (-95..-85, 30..40).
    assert_eq!(locate(&regions, &tree, -90.0, 35.0).unwrap().name, "Texas");
    // The gap between them.
    assert!(locate(&regions, &tree, -97.5, 35.0).is_none());
}

#[test]
fn selection_flows_over_loaded_data() {
    let dataset = Dataset::builtin();
    let regions = load_regions(&fixture_input(), &STATE_NAMES).unwrap();

    let mut region_panel = RegionPanel::new(
        regions.iter().map(|r| r.name.clone()),
        dataset.densities.clone(),
    );
    assert!(region_panel.click("California"));
    assert_eq!(region_panel.popup().unwrap().density_label, "253");
    // Reselecting moves straight to the new region.
    assert!(region_panel.click("Texas"));
    assert_eq!(region_panel.selected(), Some("Texas"));
    region_panel.close();
    assert_eq!(region_panel.selected(), None);

    let mut marker_panel = MarkerPanel::new(dataset.markers);
    marker_panel.click(1);
    assert_eq!(marker_panel.popup().unwrap().name, "Muhsinah");
    marker_panel.close();
    assert!(marker_panel.popup().is_none());
}
