pub mod clock;
pub mod composition;
pub mod controller;
pub mod history;
pub mod pool;
pub mod reprojection;

pub use clock::{Clock, LapStats};
pub use composition::CompositionStage;
pub use controller::{SampleCounter, TemporalFilter, TickOutput, TickReport};
pub use history::{HistoryState, HistoryStore};
pub use pool::{FrameBufferPool, PoolStats, PooledBuffer, SharedPool};
pub use reprojection::{
    closest_depth_offset, confidence_weight, valid_depth, velocity_error, BlendStats, Reprojected,
    ReprojectionStage,
};
