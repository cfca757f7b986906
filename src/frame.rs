use glam::{Vec2, Vec4};

use crate::error::{FilterError, FilterResult};
use crate::types::{BufferDesc, PixelFormat};

/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    pub number: u64,
    pub time: f32,
    pub delta: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f32, delta: f32) -> Self {
        Self { number, time, delta }
    }
}

/// Infinite iterator over frame timings with a repeating pacing pattern.
/// Use this in a loop: `for info in FrameTimeline::fixed(1.0 / 60.0).take(n) { ... }`
#[derive(Debug, Clone)]
pub struct FrameTimeline {
    frame_number: u64,
    time: f32,
    pacing: Vec<f32>,
}

impl FrameTimeline {
    /// Constant frame delta
    pub fn fixed(delta: f32) -> Self {
        Self::paced(vec![delta])
    }

    /// Cycle through the given deltas, emulating uneven frame pacing.
    /// An empty pattern falls back to 60 Hz.
    pub fn paced(pacing: Vec<f32>) -> Self {
        let pacing = if pacing.is_empty() { vec![1.0 / 60.0] } else { pacing };
        Self {
            frame_number: 0,
            time: 0.0,
            pacing,
        }
    }
}

impl Iterator for FrameTimeline {
    type Item = FrameInfo;

    fn next(&mut self) -> Option<FrameInfo> {
        let delta = self.pacing[(self.frame_number % self.pacing.len() as u64) as usize];
        let info = FrameInfo::new(self.frame_number, self.time, delta);

        self.frame_number += 1;
        self.time += delta;

        Some(info)
    }
}

/// One tick of input: color, motion and depth planes plus the elapsed time.
///
/// Motion is measured in pixels and points from where the content was in
/// the previous frame to where it is now, so the history position of pixel
/// `p` is `p - motion`.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    format: PixelFormat,
    color: Vec<Vec4>,
    motion: Vec<Vec2>,
    depth: Vec<f32>,
    delta_time: f32,
}

impl Frame {
    /// Build a frame, checking every plane against `width * height`.
    pub fn new(
        width: u32,
        height: u32,
        color: Vec<Vec4>,
        motion: Vec<Vec2>,
        depth: Vec<f32>,
        delta_time: f32,
    ) -> FilterResult<Self> {
        let desc = BufferDesc::new(width, height, PixelFormat::default())?;
        let expected = desc.pixel_count();

        for (channel, actual) in [
            ("color", color.len()),
            ("motion", motion.len()),
            ("depth", depth.len()),
        ] {
            if actual != expected {
                return Err(FilterError::FrameMismatch {
                    channel,
                    expected,
                    actual,
                });
            }
        }

        Ok(Self {
            width,
            height,
            format: desc.format,
            color,
            motion,
            depth,
            delta_time,
        })
    }

    /// Uniform frame: one color, one depth, one motion vector everywhere
    pub fn uniform(
        width: u32,
        height: u32,
        color: Vec4,
        motion: Vec2,
        depth: f32,
        delta_time: f32,
    ) -> FilterResult<Self> {
        let count = width as usize * height as usize;
        Self::new(
            width,
            height,
            vec![color; count],
            vec![motion; count],
            vec![depth; count],
            delta_time,
        )
    }

    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Shape of the color planes this frame needs
    pub fn desc(&self) -> BufferDesc {
        BufferDesc {
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }

    pub fn color(&self) -> &[Vec4] {
        &self.color
    }

    pub fn motion(&self) -> &[Vec2] {
        &self.motion
    }

    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }
}
