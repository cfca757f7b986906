use glam::{Vec2, Vec4};

use crate::math::hsv_to_rgb;

/// Size of one checker cell in pixels
pub const CHECKER_CELL: f32 = 8.0;

/// Deterministic per-pixel, per-frame noise in `[-1, 1]`
pub fn hash_noise(x: u32, y: u32, frame: u64) -> f32 {
    let mut h = x.wrapping_mul(0x8da6_b343)
        ^ y.wrapping_mul(0xd816_3841)
        ^ (frame as u32).wrapping_mul(0xcb1a_b31f);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;

    (h as f32 / u32::MAX as f32) * 2.0 - 1.0
}

/// Hue-graded checkerboard evaluated at a continuous position
pub fn pattern_color(pos: Vec2, saturation: f32) -> Vec4 {
    let cell = ((pos.x / CHECKER_CELL).floor() as i64 + (pos.y / CHECKER_CELL).floor() as i64)
        .rem_euclid(2) as f32;
    let hue = (pos.x * 0.01 + pos.y * 0.003).rem_euclid(1.0);
    let [r, g, b] = hsv_to_rgb(hue, saturation, 0.4 + 0.4 * cell);
    Vec4::new(r, g, b, 1.0)
}

/// Add rgb noise of the given amplitude, leaving alpha alone
pub fn add_noise(color: Vec4, amplitude: f32, x: u32, y: u32, frame: u64) -> Vec4 {
    if amplitude == 0.0 {
        return color;
    }
    let n = hash_noise(x, y, frame) * amplitude;
    color + Vec4::new(n, n, n, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_deterministic_and_bounded() {
        for frame in 0..4 {
            for x in 0..16 {
                let n = hash_noise(x, 3, frame);
                assert_eq!(n, hash_noise(x, 3, frame));
                assert!((-1.0..=1.0).contains(&n));
            }
        }
    }

    #[test]
    fn noise_changes_between_frames() {
        let differing = (0..32).filter(|&x| hash_noise(x, 0, 0) != hash_noise(x, 0, 1)).count();
        assert!(differing > 16);
    }

    #[test]
    fn pattern_alternates_cells() {
        let a = pattern_color(Vec2::new(1.0, 1.0), 0.0);
        let b = pattern_color(Vec2::new(1.0 + CHECKER_CELL, 1.0), 0.0);
        assert!((a.x - 0.4).abs() < 1e-5);
        assert!((b.x - 0.8).abs() < 1e-5);
        assert_eq!(a.w, 1.0);
    }
}
