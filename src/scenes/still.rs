use glam::{Vec2, Vec4};

use super::common::{add_noise, pattern_color};
use crate::error::FilterResult;
use crate::frame::{Frame, FrameInfo};
use crate::math::pixel_center;
use crate::traits::{FrameSource, SceneFrame};

/// Camera and content at rest; only the per-frame noise changes.
#[derive(Debug, Clone)]
pub struct StaticScene {
    pub width: u32,
    pub height: u32,
    pub depth: f32,
    pub noise: f32,
}

impl StaticScene {
    pub fn new(width: u32, height: u32, noise: f32) -> Self {
        Self {
            width,
            height,
            depth: 10.0,
            noise,
        }
    }
}

impl FrameSource for StaticScene {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn render(&self, info: &FrameInfo) -> FilterResult<SceneFrame> {
        let count = self.width as usize * self.height as usize;
        let mut reference = Vec::with_capacity(count);
        let mut color = Vec::with_capacity(count);

        for y in 0..self.height {
            for x in 0..self.width {
                let clean = pattern_color(pixel_center(x, y), 0.6);
                reference.push(clean);
                color.push(add_noise(clean, self.noise, x, y, info.number));
            }
        }

        let frame = Frame::new(
            self.width,
            self.height,
            color,
            vec![Vec2::ZERO; count],
            vec![self.depth; count],
            info.delta,
        )?;

        Ok(SceneFrame { frame, reference })
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
