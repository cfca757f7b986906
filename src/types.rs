use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};

/// Storage format requested for a buffer.
///
/// Pixels are always held as `f32` lanes on the CPU; the format decides pool
/// keys, byte accounting and whether two frames are layout compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    #[default]
    Rgba16Float,
    Rgba32Float,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Rgba16Float => 8,
            Self::Rgba32Float => 16,
        }
    }
}

/// Motion+depth and remap buffers use half floats, like the color history
/// of the default configuration.
pub const AUX_FORMAT: PixelFormat = PixelFormat::Rgba16Float;

/// Shape of a pooled buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl BufferDesc {
    /// Validated constructor; zero-sized buffers are rejected.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> FilterResult<Self> {
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height, format })
    }

    pub fn with_format(self, format: PixelFormat) -> Self {
        Self { format, ..self }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn byte_size(&self) -> u64 {
        self.pixel_count() as u64 * self.format.bytes_per_pixel() as u64
    }
}

/// Identity of one acquisition from a pool. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// Kind of tick chosen by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickKind {
    /// History discarded, output is the raw frame
    Reset,
    /// History reprojected and blended with the raw frame
    Update,
}

/// Why a tick was forced to be a reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetReason {
    NoHistory,
    Interval,
    LayoutChanged,
    Requested,
}
