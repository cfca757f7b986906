use glam::{Vec2, Vec4};

use super::grid::{contains, pixel_index, position_to_pixel};

/// Read-only view over a row-major RGBA plane
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [Vec4],
}

impl<'a> ImageView<'a> {
    pub fn new(width: u32, height: u32, pixels: &'a [Vec4]) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self { width, height, pixels }
    }

    /// Texel under `pos`, `None` when `pos` is off the image
    pub fn nearest(&self, pos: Vec2) -> Option<Vec4> {
        if !contains(pos, self.width, self.height) {
            return None;
        }
        pixel_index(position_to_pixel(pos), self.width, self.height).map(|i| self.pixels[i])
    }

    /// Bilinear filter with clamp-to-edge addressing.
    ///
    /// Taps with zero weight are skipped, so a sample taken exactly on a
    /// texel center is that texel even when a neighbour is not finite.
    pub fn bilinear(&self, pos: Vec2) -> Vec4 {
        let uv = pos - Vec2::splat(0.5);
        let base = uv.floor();
        let frac = uv - base;

        let max_x = self.width as i32 - 1;
        let max_y = self.height as i32 - 1;
        let x0 = (base.x as i32).clamp(0, max_x);
        let y0 = (base.y as i32).clamp(0, max_y);
        let x1 = (base.x as i32 + 1).clamp(0, max_x);
        let y1 = (base.y as i32 + 1).clamp(0, max_y);

        let taps = [
            (x0, y0, (1.0 - frac.x) * (1.0 - frac.y)),
            (x1, y0, frac.x * (1.0 - frac.y)),
            (x0, y1, (1.0 - frac.x) * frac.y),
            (x1, y1, frac.x * frac.y),
        ];

        taps.iter()
            .filter(|(_, _, weight)| *weight > 0.0)
            .map(|&(x, y, weight)| self.pixels[y as usize * self.width as usize + x as usize] * weight)
            .sum()
    }
}
