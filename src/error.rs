//! Error type shared by the filter stages.

/// Errors surfaced by the temporal filter API.
///
/// Per-pixel problems (NaN depth, broken motion vectors) are not errors: the
/// blend absorbs them by falling back to the raw sample.
#[derive(thiserror::Error, Debug)]
pub enum FilterError {
    #[error("invalid buffer dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("history committed twice in tick {tick}")]
    DoubleCommit { tick: u64 },

    #[error("frame {channel} has {actual} entries, expected {expected}")]
    FrameMismatch {
        channel: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
