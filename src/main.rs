use anyhow::Result;
use clap::Parser;

use temporal_reprojection::cli::Cli;
use temporal_reprojection::demo;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let summary = demo::run(&cli)?;

    if !cli.quiet {
        println!(
            "{} {}x{}: {} frames ({} resets, {} updates)",
            summary.scene, summary.width, summary.height, summary.frames, summary.resets, summary.updates
        );
        println!(
            "error vs reference: raw {:.5}, filtered {:.5}; mean confidence {:.3}",
            summary.raw_error, summary.filtered_error, summary.mean_confidence
        );
        println!(
            "tick cost: mean {:.3} ms, min {:.3} ms, max {:.3} ms; pool hit rate {:.1}%",
            summary.timing.mean_ms(),
            summary.timing.min_ms,
            summary.timing.max_ms,
            summary.pool.hit_rate() * 100.0
        );
    }

    Ok(())
}
