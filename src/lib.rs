pub mod cli;
pub mod config;
pub mod core;
pub mod demo;
pub mod error;
pub mod frame;
pub mod math;
pub mod scenes;
pub mod traits;
pub mod types;

pub use config::{BlendParameters, FilterConfig, HistoryMode, ReprojectionMode, TemporalQuality, ToneAdjust};
pub use crate::core::{FrameBufferPool, HistoryStore, PooledBuffer, TemporalFilter, TickOutput, TickReport};
pub use error::{FilterError, FilterResult};
pub use frame::{Frame, FrameInfo, FrameTimeline};
pub use types::{BufferDesc, PixelFormat, ResetReason, TickKind};
