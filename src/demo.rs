//! Offline driver: renders a synthetic scene, filters every frame and
//! measures how far raw and filtered images are from the clean reference.

use anyhow::{Context, Result};
use glam::Vec4;
use log::info;
use serde::Serialize;

use crate::cli::Cli;
use crate::config::FilterConfig;
use crate::core::{Clock, LapStats, PoolStats, TemporalFilter};
use crate::frame::FrameTimeline;
use crate::scenes::create_scene;
use crate::types::TickKind;

/// Outcome of one run, written out by `--report`
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub scene: &'static str,
    pub width: u32,
    pub height: u32,
    pub frames: u64,
    pub resets: u64,
    pub updates: u64,
    pub mean_confidence: f64,
    /// Mean absolute rgb error of the raw input against the reference
    pub raw_error: f64,
    /// Mean absolute rgb error of the filtered output against the reference
    pub filtered_error: f64,
    pub timing: LapStats,
    pub pool: PoolStats,
    pub config: FilterConfig,
}

/// Mean absolute rgb difference between two images of equal size
pub fn mean_abs_error(a: &[Vec4], b: &[Vec4]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let total: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let d = (x.truncate() - y.truncate()).abs();
            (d.x + d.y + d.z) as f64 / 3.0
        })
        .sum();
    total / a.len() as f64
}

pub fn run(cli: &Cli) -> Result<RunSummary> {
    let config = cli.filter_config().context("failed to build filter config")?;
    let scene = create_scene(cli.scene, cli.width, cli.height, cli.noise);
    info!(
        "running {} scene at {}x{} for {} frames with {:?}",
        scene.name(),
        cli.width,
        cli.height,
        cli.frames,
        config
    );

    let mut filter = TemporalFilter::new(config.clone());
    let mut clock = Clock::new();
    let mut last_output = None;

    let mut resets = 0u64;
    let mut updates = 0u64;
    let mut confidence_sum = 0.0f64;
    let mut raw_error = 0.0f64;
    let mut filtered_error = 0.0f64;

    for info in FrameTimeline::paced(cli.pacing()).take(cli.frames as usize) {
        let sample = scene
            .render(&info)
            .with_context(|| format!("failed to render frame {}", info.number))?;

        clock.start();
        let output = filter
            .process(&sample.frame)
            .with_context(|| format!("filter failed on frame {}", info.number))?;
        clock.lap();

        match output.report.kind {
            TickKind::Reset => resets += 1,
            TickKind::Update => {
                updates += 1;
                confidence_sum += output.report.blend.mean_confidence as f64;
            }
        }

        raw_error += mean_abs_error(sample.frame.color(), &sample.reference);
        filtered_error += mean_abs_error(output.image.pixels(), &sample.reference);
        last_output = Some(output.image);
    }

    if let (Some(path), Some(image)) = (&cli.dump, &last_output) {
        std::fs::write(path, image.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("last output written to {}", path.display());
    }

    drop(last_output);
    filter.shutdown();

    let frames = resets + updates;
    let summary = RunSummary {
        scene: scene.name(),
        width: cli.width,
        height: cli.height,
        frames,
        resets,
        updates,
        mean_confidence: if updates > 0 { confidence_sum / updates as f64 } else { 0.0 },
        raw_error: raw_error / frames.max(1) as f64,
        filtered_error: filtered_error / frames.max(1) as f64,
        timing: clock.stats(),
        pool: filter.pool().stats(),
        config,
    };

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        info!("report written to {}", path.display());
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn mean_abs_error_ignores_alpha() {
        let a = vec![Vec4::new(1.0, 1.0, 1.0, 0.0); 2];
        let b = vec![Vec4::new(0.0, 1.0, 1.0, 1.0); 2];
        assert!((mean_abs_error(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(mean_abs_error(&[], &[]), 0.0);
    }

    #[test]
    fn static_run_reduces_noise() {
        let cli = Cli::parse_from([
            "temporal-reprojection",
            "--scene",
            "static",
            "--width",
            "32",
            "--height",
            "16",
            "--frames",
            "40",
            "--noise",
            "0.2",
        ]);
        let summary = run(&cli).unwrap();

        assert_eq!(summary.frames, 40);
        assert_eq!(summary.resets, 1);
        assert!(summary.filtered_error < summary.raw_error);
        assert_eq!(summary.pool.live(), 0);
    }
}
