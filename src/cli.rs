// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::config::{FilterConfig, HistoryMode, ReprojectionMode, TemporalQuality};
use crate::error::FilterResult;
use crate::scenes::SceneKind;

#[derive(Parser, Debug, Clone)]
#[command(name = "temporal-reprojection")]
#[command(about = "Run the temporal reprojection filter over a synthetic scene", long_about = None)]
pub struct Cli {
    /// Scene to render
    #[arg(long, value_enum, default_value_t = SceneKind::MovingBox)]
    pub scene: SceneKind,

    #[arg(long, default_value_t = 256)]
    pub width: u32,

    #[arg(long, default_value_t = 144)]
    pub height: u32,

    /// Number of ticks to run
    #[arg(long, default_value_t = 240)]
    pub frames: u64,

    /// Nominal frame rate of the synthetic timeline
    #[arg(long, default_value_t = 60.0)]
    pub fps: f32,

    /// Alternate between fps and fps/2 to emulate uneven pacing
    #[arg(long = "uneven-pacing", default_value = "false")]
    pub uneven_pacing: bool,

    /// Amplitude of per-frame rgb noise
    #[arg(long, default_value_t = 0.05)]
    pub noise: f32,

    /// Start from a preset instead of the defaults
    #[arg(long, value_enum)]
    pub quality: Option<TemporalQuality>,

    /// JSON filter config; overrides the preset
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub motion_weight: Option<f32>,

    #[arg(long)]
    pub depth_weight: Option<f32>,

    /// Values below 1 are treated as 1
    #[arg(long, allow_negative_numbers = true)]
    pub sample_interval: Option<i32>,

    #[arg(long)]
    pub history_limit: Option<f32>,

    #[arg(long = "neighbor-search", default_value = "false")]
    pub neighbor_search: bool,

    #[arg(long, value_enum)]
    pub mode: Option<ReprojectionMode>,

    #[arg(long, value_enum)]
    pub history: Option<HistoryMode>,

    /// Write a JSON run summary here
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Write the last output as raw little-endian RGBA f32
    #[arg(long)]
    pub dump: Option<PathBuf>,

    /// Disable console output
    #[arg(long = "quiet", default_value = "false")]
    pub quiet: bool,
}

impl Cli {
    /// Config file, else preset, else defaults; then flag overrides.
    pub fn filter_config(&self) -> FilterResult<FilterConfig> {
        let mut config = match (&self.config, self.quality) {
            (Some(path), _) => FilterConfig::load(path)?,
            (None, Some(quality)) => quality.to_config(),
            (None, None) => FilterConfig::default(),
        };

        if let Some(weight) = self.motion_weight {
            config.params.motion_weight = weight;
        }
        if let Some(weight) = self.depth_weight {
            config.params.depth_weight = weight;
        }
        if let Some(interval) = self.sample_interval {
            config.params.sample_interval = interval;
        }
        if let Some(limit) = self.history_limit {
            config.params.history_limit = limit;
        }
        if self.neighbor_search {
            config.params.neighbor_search = true;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(history) = self.history {
            config.history = history;
        }

        Ok(config)
    }

    /// Frame deltas the synthetic timeline cycles through
    pub fn pacing(&self) -> Vec<f32> {
        let delta = 1.0 / self.fps.max(1.0);
        if self.uneven_pacing {
            vec![delta, delta * 2.0]
        } else {
            vec![delta]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let cli = Cli::parse_from(["temporal-reprojection"]);
        assert_eq!(cli.scene, SceneKind::MovingBox);
        assert_eq!(cli.filter_config().unwrap(), FilterConfig::default());
        assert_eq!(cli.pacing().len(), 1);
    }

    #[test]
    fn flags_override_preset() {
        let cli = Cli::parse_from([
            "temporal-reprojection",
            "--quality",
            "basic",
            "--sample-interval",
            "-2",
            "--history",
            "remap-chain",
            "--neighbor-search",
        ]);
        let config = cli.filter_config().unwrap();
        assert_eq!(config.params.sample_interval, -2);
        assert_eq!(config.params.interval(), 1);
        assert_eq!(config.params.history_limit, 0.9);
        assert_eq!(config.history, HistoryMode::RemapChain);
        assert!(config.params.neighbor_search);
    }

    #[test]
    fn uneven_pacing_alternates() {
        let cli = Cli::parse_from(["temporal-reprojection", "--fps", "50", "--uneven-pacing"]);
        let pacing = cli.pacing();
        assert_eq!(pacing.len(), 2);
        assert!((pacing[1] - 0.04).abs() < 1e-6);
    }
}
