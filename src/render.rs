//! Pre-renders the choropleth as transparent PNG overlay tiles. Each pixel
//! inside a region takes that region's density bucket color; everything
//! else stays transparent, so the base map shows through.

use crate::config::AppConfig;
use crate::index::{locate_index, RegionIndex};
use crate::palette::{color_for, hex_to_rgba};
use crate::types::Region;
use anyhow::{Context, Result};
use geo::algorithm::bounding_rect::BoundingRect;
use image::{ImageBuffer, Rgba, RgbaImage};
use rayon::prelude::*;
use rstar::RTree;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fs;
use tracing::{info, warn};

const TILE_SIZE: u32 = 256;

/// Matches the 0.7 fill opacity the interactive layer uses.
const FILL_ALPHA: u8 = 178;

pub fn generate_tiles(
    config: &AppConfig,
    regions: &[Region],
    tree: &RTree<RegionIndex>,
    densities: &HashMap<String, f64>,
) -> Result<()> {
    info!(
        min_zoom = config.output.min_zoom,
        max_zoom = config.output.max_zoom,
        "generating choropleth tiles"
    );

    // One fill per region, resolved up front.
    let fills: Vec<Rgba<u8>> = regions
        .iter()
        .map(|r| hex_to_rgba(color_for(densities.get(&r.name).copied()), FILL_ALPHA))
        .collect();

    let bounds = dataset_bounds(regions);

    for zoom in config.output.min_zoom..=config.output.max_zoom {
        render_zoom_level(config, regions, tree, &fills, bounds, zoom)?;
    }

    info!("tile generation complete");
    Ok(())
}

/// Overall lon/lat bounds of the dataset, used to skip empty tiles.
fn dataset_bounds(regions: &[Region]) -> (f64, f64, f64, f64) {
    let mut min_lon = f64::MAX;
    let mut min_lat = f64::MAX;
    let mut max_lon = f64::MIN;
    let mut max_lat = f64::MIN;
    for region in regions {
        if let Some(rect) = region.geometry.bounding_rect() {
            min_lon = min_lon.min(rect.min().x);
            min_lat = min_lat.min(rect.min().y);
            max_lon = max_lon.max(rect.max().x);
            max_lat = max_lat.max(rect.max().y);
        }
    }
    (min_lon, min_lat, max_lon, max_lat)
}

fn render_zoom_level(
    config: &AppConfig,
    regions: &[Region],
    tree: &RTree<RegionIndex>,
    fills: &[Rgba<u8>],
    bounds: (f64, f64, f64, f64),
    zoom: u8,
) -> Result<()> {
    let (min_lon, min_lat, max_lon, max_lat) = bounds;
    let (tx_min, ty_min, _, _) = lat_lon_to_tile_pixel(max_lat, min_lon, zoom);
    let (tx_max, ty_max, _, _) = lat_lon_to_tile_pixel(min_lat, max_lon, zoom);

    let z_dir = config.output.tile_dir.join(zoom.to_string());
    fs::create_dir_all(&z_dir).context("Failed to create zoom directory")?;

    let tiles: Vec<(u32, u32)> = (tx_min..=tx_max)
        .flat_map(|tx| (ty_min..=ty_max).map(move |ty| (tx, ty)))
        .collect();

    tiles.par_iter().for_each(|&(tx, ty)| {
        let Some(img) = render_tile(regions, tree, fills, zoom, tx, ty) else {
            return;
        };
        let x_dir = z_dir.join(tx.to_string());
        if !x_dir.exists() {
            let _ = fs::create_dir_all(&x_dir);
        }
        let path = x_dir.join(format!("{}.png", ty));
        if let Err(e) = img.save(&path) {
            warn!("failed to save tile {:?}: {:?}", path, e);
        }
    });

    info!(zoom, tiles = tiles.len(), "rendered zoom level");
    Ok(())
}

/// Rasterizes one tile. Returns None when no region touches it, so fully
/// transparent tiles are never written to disk.
fn render_tile(
    regions: &[Region],
    tree: &RTree<RegionIndex>,
    fills: &[Rgba<u8>],
    zoom: u8,
    tx: u32,
    ty: u32,
) -> Option<RgbaImage> {
    let mut img: RgbaImage = ImageBuffer::new(TILE_SIZE, TILE_SIZE);
    let mut touched = false;

    for py in 0..TILE_SIZE {
        for px in 0..TILE_SIZE {
            // Sample at the pixel center.
            let (lat, lon) = tile_pixel_to_lat_lon(
                tx,
                ty,
                px as f64 + 0.5,
                py as f64 + 0.5,
                zoom,
            );
            if let Some(i) = locate_index(regions, tree, lon, lat) {
                img.put_pixel(px, py, fills[i]);
                touched = true;
            }
        }
    }

    touched.then_some(img)
}

// Web Mercator conversions.

fn lat_lon_to_tile_pixel(lat: f64, lon: f64, zoom: u8) -> (u32, u32, u32, u32) {
    let n = 2.0_f64.powi(zoom as i32);
    let x_t = (lon + 180.0) / 360.0 * n;
    let lat_rad = lat.to_radians();
    let y_t = (1.0 - (lat_rad.tan() + (1.0 / lat_rad.cos())).ln() / PI) / 2.0 * n;

    let tx = (x_t.max(0.0) as u32).min(n as u32 - 1);
    let ty = (y_t.max(0.0) as u32).min(n as u32 - 1);

    let px = ((x_t - tx as f64) * TILE_SIZE as f64) as u32;
    let py = ((y_t - ty as f64) * TILE_SIZE as f64) as u32;

    (tx, ty, px, py)
}

fn tile_pixel_to_lat_lon(tx: u32, ty: u32, px: f64, py: f64, zoom: u8) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom as i32);
    let x_t = tx as f64 + px / TILE_SIZE as f64;
    let y_t = ty as f64 + py / TILE_SIZE as f64;
    let lon = x_t / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y_t / n)).sinh().atan().to_degrees();
    (lat, lon)
}
