use image::Rgba;

/// Orange ramp, darkest first. Every region fill comes from this table.
pub const BUCKETS: [&str; 6] = [
    "#7f2704", "#d94801", "#f16913", "#fd8d3c", "#fdae6b", "#fee6ce",
];

/// Maps a population density (people per square mile) to one of six fixed
/// fill colors. Thresholds are strict, so a density of exactly 500 falls in
/// the `> 250` bucket. A missing density colors like zero.
pub fn color_for(density: Option<f64>) -> &'static str {
    let d = density.unwrap_or(0.0);
    if d > 500.0 {
        BUCKETS[0]
    } else if d > 250.0 {
        BUCKETS[1]
    } else if d > 100.0 {
        BUCKETS[2]
    } else if d > 50.0 {
        BUCKETS[3]
    } else if d > 20.0 {
        BUCKETS[4]
    } else {
        BUCKETS[5]
    }
}

/// Parses a `#rrggbb` hex code into an opaque RGBA pixel. Malformed input
/// degrades to black rather than failing, since every caller feeds it the
/// constants above.
pub fn hex_to_rgba(hex: &str, alpha: u8) -> Rgba<u8> {
    let hex = hex.trim_start_matches('#');
    let r = u8::from_str_radix(hex.get(0..2).unwrap_or(""), 16).unwrap_or(0);
    let g = u8::from_str_radix(hex.get(2..4).unwrap_or(""), 16).unwrap_or(0);
    let b = u8::from_str_radix(hex.get(4..6).unwrap_or(""), 16).unwrap_or(0);
    Rgba([r, g, b, alpha])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries_are_strict() {
        // On each threshold the value stays in the lower bucket; one above
        // crosses into the next.
        for (threshold, below, above) in [
            (20.0, BUCKETS[5], BUCKETS[4]),
            (50.0, BUCKETS[4], BUCKETS[3]),
            (100.0, BUCKETS[3], BUCKETS[2]),
            (250.0, BUCKETS[2], BUCKETS[1]),
            (500.0, BUCKETS[1], BUCKETS[0]),
        ] {
            assert_eq!(color_for(Some(threshold - 1.0)), below);
            assert_eq!(color_for(Some(threshold)), below);
            assert_eq!(color_for(Some(threshold + 1.0)), above);
        }
    }

    #[test]
    fn test_every_density_hits_one_of_six_codes() {
        for d in [-5.0, 0.0, 1.3, 20.0, 64.0, 108.0, 253.0, 417.0, 741.0, 1212.0] {
            assert!(BUCKETS.contains(&color_for(Some(d))));
        }
    }

    #[test]
    fn test_missing_density_colors_like_zero() {
        assert_eq!(color_for(None), color_for(Some(0.0)));
        assert_eq!(color_for(None), "#fee6ce");
    }

    #[test]
    fn test_hex_to_rgba() {
        assert_eq!(hex_to_rgba("#d94801", 255), Rgba([0xd9, 0x48, 0x01, 255]));
        assert_eq!(hex_to_rgba("fee6ce", 178), Rgba([0xfe, 0xe6, 0xce, 178]));
        assert_eq!(hex_to_rgba("#bad", 255), Rgba([0xba, 0, 0, 255]));
    }
}
