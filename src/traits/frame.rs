use glam::Vec4;

use crate::error::FilterResult;
use crate::frame::{Frame, FrameInfo};

/// Rendered input for one tick plus the noise-free image it approximates
#[derive(Debug, Clone)]
pub struct SceneFrame {
    pub frame: Frame,
    pub reference: Vec<Vec4>,
}

/// Producer of per-tick filter input
pub trait FrameSource {
    /// Output dimensions in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Render the frame for the given timing
    fn render(&self, info: &FrameInfo) -> FilterResult<SceneFrame>;

    /// Short scene name used in logs and reports
    fn name(&self) -> &'static str;
}
