use glam::{Vec2, Vec4};

use super::common::{add_noise, pattern_color};
use crate::error::FilterResult;
use crate::frame::{Frame, FrameInfo};
use crate::math::{hsv_to_rgb, pixel_center};
use crate::traits::{FrameSource, SceneFrame};

const BACKGROUND_DEPTH: f32 = 20.0;
const BOX_DEPTH: f32 = 4.0;

/// Static backdrop with a near square sliding horizontally across it,
/// wrapping at the right edge. Exercises disocclusion and depth rejection.
#[derive(Debug, Clone)]
pub struct MovingBoxScene {
    pub width: u32,
    pub height: u32,
    pub box_size: f32,
    /// Pixels per second
    pub speed: f32,
    pub noise: f32,
}

impl MovingBoxScene {
    pub fn new(width: u32, height: u32, speed: f32, noise: f32) -> Self {
        Self {
            width,
            height,
            box_size: (width.min(height) as f32 * 0.4).max(1.0),
            speed,
            noise,
        }
    }

    /// Top-left corner of the box at `time`
    pub fn box_origin(&self, time: f32) -> Vec2 {
        let x = (self.width as f32 * 0.1 + self.speed * time).rem_euclid(self.width as f32);
        let y = (self.height as f32 - self.box_size) * 0.5;
        Vec2::new(x, y)
    }

    fn covers(&self, origin: Vec2, pos: Vec2) -> bool {
        let local = pos - origin;
        local.x >= 0.0 && local.y >= 0.0 && local.x < self.box_size && local.y < self.box_size
    }
}

impl FrameSource for MovingBoxScene {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn render(&self, info: &FrameInfo) -> FilterResult<SceneFrame> {
        let count = self.width as usize * self.height as usize;
        let origin = self.box_origin(info.time);
        let box_motion = Vec2::new(self.speed * info.delta, 0.0);
        let [r, g, b] = hsv_to_rgb(0.08, 0.9, 0.9);
        let box_tint = Vec4::new(r, g, b, 1.0);

        let mut reference = Vec::with_capacity(count);
        let mut color = Vec::with_capacity(count);
        let mut motion = Vec::with_capacity(count);
        let mut depth = Vec::with_capacity(count);

        for y in 0..self.height {
            for x in 0..self.width {
                let pos = pixel_center(x, y);
                let (clean, m, d) = if self.covers(origin, pos) {
                    let stripes = pattern_color(pos - origin, 0.0);
                    (box_tint * stripes.x.max(0.5), box_motion, BOX_DEPTH)
                } else {
                    (pattern_color(pos, 0.6), Vec2::ZERO, BACKGROUND_DEPTH)
                };

                reference.push(clean.truncate().extend(1.0));
                color.push(add_noise(clean.truncate().extend(1.0), self.noise, x, y, info.number));
                motion.push(m);
                depth.push(d);
            }
        }

        let frame = Frame::new(self.width, self.height, color, motion, depth, info.delta)?;
        Ok(SceneFrame { frame, reference })
    }

    fn name(&self) -> &'static str {
        "moving_box"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_pixels_are_near_and_moving() {
        let scene = MovingBoxScene::new(40, 20, 120.0, 0.0);
        let info = FrameInfo::new(0, 0.0, 0.5);
        let out = scene.render(&info).unwrap();

        let origin = scene.box_origin(0.0);
        let inside = (origin.y as usize + 1) * 40 + origin.x as usize + 1;
        assert_eq!(out.frame.depth()[inside], BOX_DEPTH);
        assert_eq!(out.frame.motion()[inside], Vec2::new(60.0, 0.0));

        assert_eq!(out.frame.depth()[0], BACKGROUND_DEPTH);
        assert_eq!(out.frame.motion()[0], Vec2::ZERO);
    }

    #[test]
    fn box_wraps_around() {
        let scene = MovingBoxScene::new(40, 20, 10.0, 0.0);
        let origin = scene.box_origin(10.0);
        assert!(origin.x >= 0.0 && origin.x < 40.0);
    }
}
