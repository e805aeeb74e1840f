//! Surface reflectivity by semantic tag

/// Intensity assigned to a return that did not come from a surface
pub const AIR_HIT_INTENSITY: f32 = 0.1;

/// Intensity used for tags not in the table
const UNKNOWN_TAG_INTENSITY: f32 = 0.5;

/// Reflectivity of the surface class `tag`.
///
/// Tags 0 (unlabeled) and 24 are near-black; road markings and signs (3, 23)
/// are the brightest.
pub fn material_intensity(tag: u32) -> f32 {
    match tag {
        0 | 24 => 0.1,
        1 => 0.8,
        2 => 0.4,
        3 | 23 => 0.99,
        4 => 0.97,
        5 => 0.95,
        6 => 0.94,
        7 => 0.93,
        8 => 0.92,
        9 => 0.91,
        10 => 0.90,
        11 => 0.89,
        12 => 0.88,
        13 => 0.87,
        14 => 0.86,
        15 => 0.85,
        16 => 0.84,
        17 => 0.83,
        18 => 0.82,
        19 => 0.81,
        20 => 0.80,
        21 => 0.79,
        22 => 0.77,
        _ => UNKNOWN_TAG_INTENSITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_edges() {
        assert_eq!(material_intensity(0), 0.1);
        assert_eq!(material_intensity(24), 0.1);
        assert_eq!(material_intensity(23), 0.99);
        assert_eq!(material_intensity(22), 0.77);
        assert_eq!(material_intensity(25), 0.5);
        assert_eq!(material_intensity(u32::MAX), 0.5);
    }
}
