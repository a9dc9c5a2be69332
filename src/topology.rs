//! Boundary loader: decodes a TopoJSON document into per-region polygons.
//!
//! TopoJSON stores shared borders once as "arcs" (optionally quantized and
//! delta-encoded) and describes each geometry as sequences of arc indexes,
//! where a negative index means the ones'-complement arc traversed
//! backwards. This module expands that back into plain `geo` polygons and
//! filters the result to the fifty-state allowlist.

use crate::config::InputConfig;
use crate::types::Region;
use anyhow::{anyhow, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use tracing::info;

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(rename = "type")]
    kind: String,
    transform: Option<Transform>,
    arcs: Vec<Vec<Vec<f64>>>,
    objects: BTreeMap<String, TopoGeometry>,
}

#[derive(Debug, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum TopoGeometry {
    GeometryCollection {
        geometries: Vec<TopoGeometry>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: serde_json::Map<String, serde_json::Value>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        properties: serde_json::Map<String, serde_json::Value>,
    },
    // Non-areal members are skipped during feature collection.
    Point {},
    MultiPoint {},
    LineString {},
    MultiLineString {},
}

/// Loads, decodes and filters the boundary file named by the config. Runs
/// once before anything is rendered or served; any failure here is fatal.
pub fn load_regions(input: &InputConfig, allowlist: &[&str]) -> Result<Vec<Region>> {
    let file = File::open(&input.topology)
        .with_context(|| format!("Failed to open topology file: {:?}", input.topology))?;
    let topo: Topology = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse TopoJSON: {:?}", input.topology))?;
    let regions = regions_from_topology(
        &topo,
        input.object.as_deref(),
        &input.name_property,
        allowlist,
    )?;
    info!(
        count = regions.len(),
        "loaded regions from {:?}", input.topology
    );
    Ok(regions)
}

fn regions_from_topology(
    topo: &Topology,
    object: Option<&str>,
    name_property: &str,
    allowlist: &[&str],
) -> Result<Vec<Region>> {
    if topo.kind != "Topology" {
        return Err(anyhow!("Expected a Topology document, got {:?}", topo.kind));
    }

    let arcs = decode_arcs(topo)?;

    let mut regions = Vec::new();
    match object {
        Some(name) => {
            let geom = topo
                .objects
                .get(name)
                .ok_or_else(|| anyhow!("Object '{}' not found in topology", name))?;
            collect_regions(geom, &arcs, name_property, allowlist, &mut regions)?;
        }
        None => {
            for geom in topo.objects.values() {
                collect_regions(geom, &arcs, name_property, allowlist, &mut regions)?;
            }
        }
    }
    Ok(regions)
}

/// Expands every arc to absolute coordinates. Quantized topologies are
/// delta-encoded per arc, with the transform mapping back to degrees.
fn decode_arcs(topo: &Topology) -> Result<Vec<Vec<Coord<f64>>>> {
    let mut decoded = Vec::with_capacity(topo.arcs.len());
    for (i, arc) in topo.arcs.iter().enumerate() {
        let mut points = Vec::with_capacity(arc.len());
        let mut x = 0.0;
        let mut y = 0.0;
        for pt in arc {
            if pt.len() < 2 {
                return Err(anyhow!("Arc {} contains a point with fewer than 2 values", i));
            }
            match &topo.transform {
                Some(t) => {
                    x += pt[0];
                    y += pt[1];
                    points.push(Coord {
                        x: x * t.scale[0] + t.translate[0],
                        y: y * t.scale[1] + t.translate[1],
                    });
                }
                None => points.push(Coord { x: pt[0], y: pt[1] }),
            }
        }
        decoded.push(points);
    }
    Ok(decoded)
}

fn collect_regions(
    geom: &TopoGeometry,
    arcs: &[Vec<Coord<f64>>],
    name_property: &str,
    allowlist: &[&str],
    out: &mut Vec<Region>,
) -> Result<()> {
    match geom {
        TopoGeometry::GeometryCollection { geometries } => {
            for g in geometries {
                collect_regions(g, arcs, name_property, allowlist, out)?;
            }
        }
        TopoGeometry::Polygon { arcs: rings, properties } => {
            if let Some(name) = feature_name(properties, name_property, allowlist) {
                let polygon = build_polygon(arcs, rings)?;
                out.push(Region {
                    name,
                    geometry: MultiPolygon::new(vec![polygon]),
                });
            }
        }
        TopoGeometry::MultiPolygon { arcs: polys, properties } => {
            if let Some(name) = feature_name(properties, name_property, allowlist) {
                let polygons = polys
                    .iter()
                    .map(|rings| build_polygon(arcs, rings))
                    .collect::<Result<Vec<_>>>()?;
                out.push(Region {
                    name,
                    geometry: MultiPolygon::new(polygons),
                });
            }
        }
        // Points and lines carry no region boundary.
        _ => {}
    }
    Ok(())
}

/// Pulls the region name out of the properties bag. Features without a
/// usable name, or with a name outside the allowlist, are dropped.
fn feature_name(
    properties: &serde_json::Map<String, serde_json::Value>,
    name_property: &str,
    allowlist: &[&str],
) -> Option<String> {
    let name = properties.get(name_property)?.as_str()?;
    allowlist
        .iter()
        .any(|allowed| *allowed == name)
        .then(|| name.to_string())
}

fn build_polygon(arcs: &[Vec<Coord<f64>>], rings: &[Vec<i64>]) -> Result<Polygon<f64>> {
    let mut stitched = rings
        .iter()
        .map(|ring| stitch_ring(arcs, ring))
        .collect::<Result<Vec<_>>>()?;
    if stitched.is_empty() {
        return Err(anyhow!("Polygon has no rings"));
    }
    let exterior = stitched.remove(0);
    Ok(Polygon::new(exterior, stitched))
}

/// Joins a sequence of arc references into one closed ring. Consecutive
/// arcs share their endpoint, so every arc after the first contributes its
/// points minus the duplicated start.
fn stitch_ring(arcs: &[Vec<Coord<f64>>], ring: &[i64]) -> Result<LineString<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::new();
    for &index in ring {
        let (arc_index, reversed) = if index < 0 {
            ((-1 - index) as usize, true)
        } else {
            (index as usize, false)
        };
        let arc = arcs
            .get(arc_index)
            .ok_or_else(|| anyhow!("Arc index {} out of range", index))?;
        let mut points = arc.clone();
        if reversed {
            points.reverse();
        }
        if coords.is_empty() {
            coords.extend(points);
        } else {
            coords.extend(points.into_iter().skip(1));
        }
    }
    Ok(LineString::from(coords))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Topology {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_quantized_arc_decoding() {
        let topo = parse(
            r#"{
                "type": "Topology",
                "transform": {"scale": [0.1, 0.5], "translate": [-110.0, 30.0]},
                "arcs": [[[0, 0], [10, 2], [5, -1]]],
                "objects": {}
            }"#,
        );
        let arcs = decode_arcs(&topo).unwrap();
        assert_eq!(
            arcs[0],
            vec![
                Coord { x: -110.0, y: 30.0 },
                Coord { x: -109.0, y: 31.0 },
                Coord { x: -108.5, y: 30.5 },
            ]
        );
    }

    #[test]
    fn test_negative_arc_index_reverses_and_stitches() {
        // Two arcs forming a triangle: arc 0 runs the bottom and right
        // edges, arc 1 runs from the same start up to the apex. The ring
        // walks arc 0 forward then arc 1 backward.
        let arcs = vec![
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 4.0, y: 0.0 },
                Coord { x: 4.0, y: 3.0 },
            ],
            vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 4.0, y: 3.0 }],
        ];
        let ring = stitch_ring(&arcs, &[0, -2]).unwrap();
        let coords: Vec<Coord<f64>> = ring.0;
        assert_eq!(
            coords,
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 4.0, y: 0.0 },
                Coord { x: 4.0, y: 3.0 },
                Coord { x: 0.0, y: 0.0 },
            ]
        );
    }

    #[test]
    fn test_allowlist_filters_features() {
        let topo = parse(
            r#"{
                "type": "Topology",
                "transform": {"scale": [1.0, 1.0], "translate": [0.0, 0.0]},
                "arcs": [
                    [[0, 0], [2, 0], [0, 2], [-2, 0], [0, -2]],
                    [[5, 0], [2, 0], [0, 2], [-2, 0], [0, -2]],
                    [[10, 0], [2, 0], [0, 2], [-2, 0], [0, -2]]
                ],
                "objects": {
                    "states": {
                        "type": "GeometryCollection",
                        "geometries": [
                            {"type": "Polygon", "arcs": [[0]], "properties": {"name": "California"}},
                            {"type": "Polygon", "arcs": [[1]], "properties": {"name": "Puerto Rico"}},
                            {"type": "Polygon", "arcs": [[2]], "properties": {"name": "Texas"}}
                        ]
                    }
                }
            }"#,
        );
        let regions =
            regions_from_topology(&topo, Some("states"), "name", &["California", "Texas"])
                .unwrap();
        let names: Vec<&str> = regions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["California", "Texas"]);
    }

    #[test]
    fn test_multipolygon_and_nameless_features() {
        let topo = parse(
            r#"{
                "type": "Topology",
                "transform": {"scale": [1.0, 1.0], "translate": [0.0, 0.0]},
                "arcs": [
                    [[0, 0], [2, 0], [0, 2], [-2, 0], [0, -2]],
                    [[5, 0], [2, 0], [0, 2], [-2, 0], [0, -2]]
                ],
                "objects": {
                    "states": {
                        "type": "GeometryCollection",
                        "geometries": [
                            {"type": "MultiPolygon", "arcs": [[[0]], [[1]]], "properties": {"name": "Hawaii"}},
                            {"type": "Polygon", "arcs": [[0]], "properties": {}}
                        ]
                    }
                }
            }"#,
        );
        let regions = regions_from_topology(&topo, None, "name", &["Hawaii"]).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].geometry.0.len(), 2);
    }

    #[test]
    fn test_non_topology_document_is_rejected() {
        let topo = parse(
            r#"{"type": "FeatureCollection", "arcs": [], "objects": {}}"#,
        );
        assert!(regions_from_topology(&topo, None, "name", &[]).is_err());
    }

    #[test]
    fn test_unknown_object_is_an_error() {
        let topo = parse(r#"{"type": "Topology", "arcs": [], "objects": {}}"#);
        let err = regions_from_topology(&topo, Some("states"), "name", &[]).unwrap_err();
        assert!(err.to_string().contains("states"));
    }
}
