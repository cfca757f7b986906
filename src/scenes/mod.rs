mod common;
mod moving_box;
mod panning;
mod still;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::traits::FrameSource;

pub use common::{hash_noise, pattern_color};
pub use moving_box::MovingBoxScene;
pub use panning::PanningScene;
pub use still::StaticScene;

/// Built-in synthetic scenes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    Static,
    Panning,
    MovingBox,
}

/// Build a scene with default motion for its kind
pub fn create_scene(kind: SceneKind, width: u32, height: u32, noise: f32) -> Box<dyn FrameSource> {
    match kind {
        SceneKind::Static => Box::new(StaticScene::new(width, height, noise)),
        SceneKind::Panning => Box::new(PanningScene::new(width, height, Vec2::new(30.0, 12.0), noise)),
        SceneKind::MovingBox => Box::new(MovingBoxScene::new(width, height, 90.0, noise)),
    }
}
