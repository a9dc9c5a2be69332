//! R-tree over region bounding boxes, shared by the tile renderer and the
//! point-lookup API. The envelope query narrows to a few candidates, then
//! an exact point-in-polygon test picks the containing region.

use crate::types::Region;
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::{Coord, Point, Rect};
use rstar::{RTree, RTreeObject, AABB};

pub struct RegionIndex {
    pub index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for RegionIndex {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub fn build_index(regions: &[Region]) -> RTree<RegionIndex> {
    let items: Vec<RegionIndex> = regions
        .iter()
        .enumerate()
        .map(|(i, region)| {
            let rect = region.geometry.bounding_rect().unwrap_or(Rect::new(
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 0.0, y: 0.0 },
            ));
            RegionIndex {
                index: i,
                aabb: AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
            }
        })
        .collect();
    RTree::bulk_load(items)
}

/// Finds the region containing the given lon/lat point, if any.
pub fn locate<'a>(
    regions: &'a [Region],
    tree: &RTree<RegionIndex>,
    lon: f64,
    lat: f64,
) -> Option<&'a Region> {
    locate_index(regions, tree, lon, lat).map(|i| &regions[i])
}

/// Like `locate`, but yields the position within `regions`. The renderer
/// uses this to pick a pre-resolved fill color.
pub fn locate_index(
    regions: &[Region],
    tree: &RTree<RegionIndex>,
    lon: f64,
    lat: f64,
) -> Option<usize> {
    let point = Point::new(lon, lat);
    let envelope = AABB::from_point([lon, lat]);
    tree.locate_in_envelope_intersecting(&envelope)
        .map(|candidate| candidate.index)
        .find(|&i| {
            regions
                .get(i)
                .is_some_and(|region| region.geometry.contains(&point))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(x0: f64, y0: f64, size: f64, name: &str) -> Region {
        Region {
            name: name.to_string(),
            geometry: MultiPolygon::new(vec![polygon![
                (x: x0, y: y0),
                (x: x0 + size, y: y0),
                (x: x0 + size, y: y0 + size),
                (x: x0, y: y0 + size),
                (x: x0, y: y0),
            ]]),
        }
    }

    #[test]
    fn test_locate_finds_containing_region() {
        let regions = vec![square(0.0, 0.0, 2.0, "West"), square(5.0, 0.0, 2.0, "East")];
        let tree = build_index(&regions);
        assert_eq!(locate(&regions, &tree, 1.0, 1.0).unwrap().name, "West");
        assert_eq!(locate(&regions, &tree, 6.0, 1.5).unwrap().name, "East");
        assert!(locate(&regions, &tree, 3.5, 1.0).is_none());
    }
}
