use clap::Parser;
use glam::Vec2;
use temporal_reprojection::cli::Cli;
use temporal_reprojection::demo;
use temporal_reprojection::frame::{FrameInfo, FrameTimeline};
use temporal_reprojection::scenes::{create_scene, PanningScene, SceneKind, StaticScene};
use temporal_reprojection::traits::FrameSource;

#[cfg(test)]
mod scene_tests {
    use super::*;

    #[test]
    fn test_every_scene_renders_requested_size() {
        for kind in [SceneKind::Static, SceneKind::Panning, SceneKind::MovingBox] {
            let scene = create_scene(kind, 24, 12, 0.05);
            assert_eq!(scene.dimensions(), (24, 12));

            let out = scene.render(&FrameInfo::new(3, 0.05, 1.0 / 60.0)).unwrap();
            assert_eq!(out.frame.width(), 24);
            assert_eq!(out.frame.height(), 12);
            assert_eq!(out.reference.len(), 24 * 12, "{} reference size", scene.name());
        }
    }

    #[test]
    fn test_panning_motion_scales_with_delta() {
        let scene = PanningScene::new(8, 8, Vec2::new(60.0, 0.0), 0.0);
        let out = scene.render(&FrameInfo::new(1, 0.5, 0.25)).unwrap();
        assert!(out.frame.motion().iter().all(|m| *m == Vec2::new(15.0, 0.0)));
    }

    #[test]
    fn test_static_scene_noise_changes_per_frame() {
        let scene = StaticScene::new(8, 8, 0.1);
        let mut timeline = FrameTimeline::fixed(1.0 / 60.0);
        let a = scene.render(&timeline.next().unwrap()).unwrap();
        let b = scene.render(&timeline.next().unwrap()).unwrap();

        assert_eq!(a.reference, b.reference);
        assert_ne!(a.frame.color(), b.frame.color());
    }
}

#[cfg(test)]
mod run_tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["temporal-reprojection", "--quiet"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_interval_counts_resets() {
        let summary = demo::run(&cli(&[
            "--scene", "static", "--width", "16", "--height", "16", "--frames", "10",
            "--sample-interval", "4",
        ]))
        .unwrap();

        assert_eq!(summary.frames, 10);
        assert_eq!(summary.resets, 3);
        assert_eq!(summary.updates, 7);
        assert_eq!(summary.pool.live(), 0);
    }

    #[test]
    fn test_panning_run_beats_raw_noise() {
        let summary = demo::run(&cli(&[
            "--scene", "panning", "--width", "48", "--height", "32", "--frames", "30",
            "--noise", "0.2", "--history-limit", "0.6",
        ]))
        .unwrap();

        assert!(
            summary.filtered_error < summary.raw_error,
            "filtered {} raw {}",
            summary.filtered_error,
            summary.raw_error
        );
    }

    #[test]
    fn test_report_is_written() {
        let path = std::env::temp_dir().join(format!("temporal-report-{}.json", std::process::id()));
        let path_arg = path.to_string_lossy().to_string();
        demo::run(&cli(&[
            "--scene", "moving-box", "--width", "16", "--height", "16", "--frames", "4",
            "--report", &path_arg,
        ]))
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["scene"], "moving_box");
        assert_eq!(json["frames"], 4);
        std::fs::remove_file(path).ok();
    }
}
