//! Filter configuration: per-tick blend parameters and the static strategy
//! choices, loadable from JSON.

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::FilterResult;

/// Per-tick blend inputs supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendParameters {
    /// Penalty applied to motion inconsistency between ticks
    pub motion_weight: f32,
    /// Penalty applied to depth discrepancy at the reprojected location
    pub depth_weight: f32,
    /// Ticks between forced resets; values below 1 behave as 1
    pub sample_interval: i32,
    /// Search a 3x3 neighbourhood for the closest-depth history sample
    pub neighbor_search: bool,
    /// Upper bound on the history weight of any pixel
    pub history_limit: f32,
}

impl Default for BlendParameters {
    fn default() -> Self {
        Self {
            motion_weight: 1.0,
            depth_weight: 20.0,
            sample_interval: 60,
            neighbor_search: false,
            history_limit: 0.9,
        }
    }
}

impl BlendParameters {
    pub fn with_motion_weight(mut self, weight: f32) -> Self {
        self.motion_weight = weight;
        self
    }

    pub fn with_depth_weight(mut self, weight: f32) -> Self {
        self.depth_weight = weight;
        self
    }

    pub fn with_sample_interval(mut self, interval: i32) -> Self {
        self.sample_interval = interval;
        self
    }

    pub fn with_neighbor_search(mut self, enabled: bool) -> Self {
        self.neighbor_search = enabled;
        self
    }

    pub fn with_history_limit(mut self, limit: f32) -> Self {
        self.history_limit = limit;
        self
    }

    /// Sample interval as used by the counter, never below 1
    pub fn interval(&self) -> u64 {
        self.sample_interval.max(1) as u64
    }

    /// Copy with every field forced into its legal range.
    pub fn sanitized(&self) -> Self {
        let clean = Self {
            motion_weight: non_negative(self.motion_weight),
            depth_weight: non_negative(self.depth_weight),
            sample_interval: self.sample_interval.max(1),
            neighbor_search: self.neighbor_search,
            history_limit: if self.history_limit.is_nan() {
                0.0
            } else {
                self.history_limit.clamp(0.0, 1.0)
            },
        };

        if clean != *self {
            warn!("blend parameters clamped: {:?} -> {:?}", self, clean);
        }

        clean
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

/// How the history position of a pixel is found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReprojectionMode {
    /// Follow the motion vector; confidence from depth and motion consistency
    #[default]
    MotionDepth,
    /// Read history at the same pixel; confidence from depth only
    HistorySwap,
}

/// What the history store carries into the next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// The blended estimate becomes next tick's history
    #[default]
    Accumulated,
    /// The raw frame becomes next tick's history
    RawFrame,
    /// The last reset frame is kept, with a chained remap into it
    RemapChain,
}

/// Final per-output adjustment; never written back into history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneAdjust {
    pub exposure: f32,
    pub clamp_negative: bool,
}

impl Default for ToneAdjust {
    fn default() -> Self {
        Self {
            exposure: 1.0,
            clamp_negative: true,
        }
    }
}

/// Everything needed to build a filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub params: BlendParameters,
    pub mode: ReprojectionMode,
    pub history: HistoryMode,
    pub tone: Option<ToneAdjust>,
    /// Idle buffers kept per buffer shape when the filter owns its pool
    pub max_idle_buffers: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            params: BlendParameters::default(),
            mode: ReprojectionMode::default(),
            history: HistoryMode::default(),
            tone: None,
            max_idle_buffers: 4,
        }
    }
}

impl FilterConfig {
    pub fn from_json_str(json: &str) -> FilterResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> FilterResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> FilterResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_params(mut self, params: BlendParameters) -> Self {
        self.params = params;
        self
    }

    pub fn with_mode(mut self, mode: ReprojectionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_history(mut self, history: HistoryMode) -> Self {
        self.history = history;
        self
    }

    pub fn with_tone(mut self, tone: ToneAdjust) -> Self {
        self.tone = Some(tone);
        self
    }
}

/// Ready-made parameter sets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TemporalQuality {
    Basic,
    Enhanced,
    High,
}

impl TemporalQuality {
    pub fn to_config(self) -> FilterConfig {
        let params = match self {
            TemporalQuality::Basic => BlendParameters {
                motion_weight: 1.0,
                depth_weight: 20.0,
                sample_interval: 30,
                neighbor_search: false,
                history_limit: 0.9,
            },
            TemporalQuality::Enhanced => BlendParameters {
                motion_weight: 1.0,
                depth_weight: 20.0,
                sample_interval: 60,
                neighbor_search: true,
                history_limit: 0.95,
            },
            TemporalQuality::High => BlendParameters {
                motion_weight: 10.0,
                depth_weight: 2000.0,
                sample_interval: 60,
                neighbor_search: true,
                history_limit: 0.98,
            },
        };

        FilterConfig::default().with_params(params)
    }
}
