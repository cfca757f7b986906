//! Reprojection of the history into the current frame and the
//! confidence-weighted blend against the raw samples.

use glam::{IVec2, Vec2, Vec4};
use serde::Serialize;

use crate::config::{BlendParameters, HistoryMode, ReprojectionMode};
use crate::core::history::HistoryState;
use crate::core::pool::{PooledBuffer, SharedPool};
use crate::frame::Frame;
use crate::math::{contains, pixel_center, pixel_index, position_to_pixel, ImageView};
use crate::types::AUX_FORMAT;

/// 3x3 search window, center first so ties keep the naive position
const NEIGHBOR_OFFSETS: [IVec2; 9] = [
    IVec2::new(0, 0),
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
];

/// Aggregate blend figures for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BlendStats {
    pub mean_confidence: f32,
    pub rejected_pixels: usize,
    pub neighbor_shifts: usize,
}

/// Buffers produced by the reprojection stage for one tick
#[derive(Debug)]
pub struct Reprojected {
    /// Per-pixel best estimate; the basis of the visible output
    pub estimate: PooledBuffer,
    /// Color to retain as history when it differs from `estimate`
    pub history_color: Option<PooledBuffer>,
    pub remap: PooledBuffer,
    pub motion_depth: PooledBuffer,
    pub stats: BlendStats,
}

/// Depth usable for a consistency test
pub fn valid_depth(depth: f32) -> bool {
    depth.is_finite() && depth >= 0.0
}

/// Difference between this tick's motion and the motion observed at the
/// history position, with the previous motion rescaled to this tick's
/// frame time so uneven pacing alone is not read as inconsistency.
pub fn velocity_error(motion: Vec2, prev_motion: Vec2, delta: f32, prev_delta: f32) -> f32 {
    let paced = delta.is_finite() && prev_delta.is_finite() && delta > 0.0 && prev_delta > 0.0;
    if paced {
        (motion - prev_motion * (delta / prev_delta)).length()
    } else {
        (motion - prev_motion).length()
    }
}

/// History weight in `[0, history_limit]`.
///
/// Strictly decreasing in both the depth discrepancy and the motion error;
/// anything non-finite or negative yields zero.
pub fn confidence_weight(
    depth: f32,
    prev_depth: f32,
    motion_error: f32,
    params: &BlendParameters,
) -> f32 {
    if !valid_depth(depth) || !valid_depth(prev_depth) || !(motion_error >= 0.0) {
        return 0.0;
    }

    let penalty =
        params.depth_weight * (depth - prev_depth).abs() + params.motion_weight * motion_error;
    if !(penalty >= 0.0) {
        return 0.0;
    }

    (params.history_limit / (1.0 + penalty)).clamp(0.0, 1.0)
}

/// Offset within the 3x3 window whose previous depth is closest to `depth`
pub fn closest_depth_offset(prev_motion_depth: &ImageView<'_>, pos: Vec2, depth: f32) -> IVec2 {
    let center = position_to_pixel(pos);
    let mut best = IVec2::ZERO;
    let mut best_diff = f32::INFINITY;

    for offset in NEIGHBOR_OFFSETS {
        let Some(index) = pixel_index(center + offset, prev_motion_depth.width, prev_motion_depth.height)
        else {
            continue;
        };

        let candidate = prev_motion_depth.pixels[index].z;
        if !valid_depth(candidate) {
            continue;
        }

        let diff = (candidate - depth).abs();
        if diff < best_diff {
            best_diff = diff;
            best = offset;
        }
    }

    best
}

struct BlendContext<'a> {
    color: ImageView<'a>,
    remap: ImageView<'a>,
    motion_depth: ImageView<'a>,
    params: &'a BlendParameters,
    delta: f32,
    prev_delta: f32,
}

struct PixelBlend {
    estimate: Vec4,
    remap: Vec4,
    confidence: f32,
    shifted: bool,
}

impl PixelBlend {
    fn raw(raw: Vec4, center: Vec2) -> Self {
        Self {
            estimate: raw,
            remap: Vec4::new(center.x, center.y, 0.0, 0.0),
            confidence: 0.0,
            shifted: false,
        }
    }
}

/// Per-pixel reprojection and blend, parameterized by strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReprojectionStage {
    mode: ReprojectionMode,
    history_mode: HistoryMode,
}

impl ReprojectionStage {
    pub fn new(mode: ReprojectionMode, history_mode: HistoryMode) -> Self {
        Self { mode, history_mode }
    }

    /// Reproject `history` into `frame`. `None` means a reset tick: the raw
    /// frame passes through and the auxiliary buffers start fresh.
    ///
    /// `history` must share the frame's layout.
    pub fn run(
        &self,
        pool: &SharedPool,
        frame: &Frame,
        history: Option<&HistoryState>,
        params: &BlendParameters,
    ) -> Reprojected {
        match history {
            Some(history) => self.blend(pool, frame, history, params),
            None => Self::pass_through(pool, frame),
        }
    }

    fn pass_through(pool: &SharedPool, frame: &Frame) -> Reprojected {
        let desc = frame.desc();
        let aux = desc.with_format(AUX_FORMAT);

        let mut estimate = pool.acquire_desc(desc);
        estimate.copy_from(frame.color());

        let mut remap = pool.acquire_desc(aux);
        let mut motion_depth = pool.acquire_desc(aux);

        let width = desc.width as usize;
        for (i, (link, md)) in remap
            .pixels_mut()
            .iter_mut()
            .zip(motion_depth.pixels_mut().iter_mut())
            .enumerate()
        {
            let center = pixel_center((i % width) as u32, (i / width) as u32);
            let motion = frame.motion()[i];
            *link = Vec4::new(center.x, center.y, 1.0, 0.0);
            *md = Vec4::new(motion.x, motion.y, frame.depth()[i], frame.delta_time());
        }

        Reprojected {
            estimate,
            history_color: None,
            remap,
            motion_depth,
            stats: BlendStats::default(),
        }
    }

    fn blend(
        &self,
        pool: &SharedPool,
        frame: &Frame,
        history: &HistoryState,
        params: &BlendParameters,
    ) -> Reprojected {
        let desc = frame.desc();
        debug_assert!(history.matches(desc));
        let aux = desc.with_format(AUX_FORMAT);

        let mut estimate = pool.acquire_desc(desc);
        let mut remap = pool.acquire_desc(aux);
        let mut motion_depth = pool.acquire_desc(aux);
        let history_color = match self.history_mode {
            HistoryMode::Accumulated => None,
            HistoryMode::RawFrame => {
                let mut carried = pool.acquire_desc(desc);
                carried.copy_from(frame.color());
                Some(carried)
            }
            HistoryMode::RemapChain => {
                let mut carried = pool.acquire_desc(desc);
                carried.copy_from(history.color.pixels());
                Some(carried)
            }
        };

        let ctx = BlendContext {
            color: history.color.view(),
            remap: history.remap.view(),
            motion_depth: history.motion_depth.view(),
            params,
            delta: frame.delta_time(),
            prev_delta: history.delta_time,
        };

        let mut stats = BlendStats::default();
        let mut confidence_sum = 0.0f64;

        for y in 0..desc.height {
            for x in 0..desc.width {
                let i = y as usize * desc.width as usize + x as usize;
                let raw = frame.color()[i];
                let motion = frame.motion()[i];
                let depth = frame.depth()[i];

                let pixel = self.blend_pixel(&ctx, pixel_center(x, y), raw, motion, depth);

                estimate.pixels_mut()[i] = pixel.estimate;
                remap.pixels_mut()[i] = pixel.remap;
                motion_depth.pixels_mut()[i] = Vec4::new(motion.x, motion.y, depth, frame.delta_time());

                confidence_sum += pixel.confidence as f64;
                if pixel.confidence <= 0.0 {
                    stats.rejected_pixels += 1;
                }
                if pixel.shifted {
                    stats.neighbor_shifts += 1;
                }
            }
        }

        stats.mean_confidence = (confidence_sum / desc.pixel_count() as f64) as f32;

        Reprojected {
            estimate,
            history_color,
            remap,
            motion_depth,
            stats,
        }
    }

    fn blend_pixel(
        &self,
        ctx: &BlendContext<'_>,
        center: Vec2,
        raw: Vec4,
        motion: Vec2,
        depth: f32,
    ) -> PixelBlend {
        if !valid_depth(depth) || !motion.is_finite() {
            return PixelBlend::raw(raw, center);
        }

        let mut pos = match self.mode {
            ReprojectionMode::MotionDepth => center - motion,
            ReprojectionMode::HistorySwap => center,
        };
        if !contains(pos, ctx.motion_depth.width, ctx.motion_depth.height) {
            return PixelBlend::raw(raw, center);
        }

        let mut shifted = false;
        if ctx.params.neighbor_search {
            let offset = closest_depth_offset(&ctx.motion_depth, pos, depth);
            if offset != IVec2::ZERO {
                pos += offset.as_vec2();
                shifted = true;
            }
        }

        let Some(prev) = ctx.motion_depth.nearest(pos) else {
            return PixelBlend::raw(raw, center);
        };

        let motion_error = match self.mode {
            ReprojectionMode::MotionDepth => {
                velocity_error(motion, prev.truncate().truncate(), ctx.delta, ctx.prev_delta)
            }
            ReprojectionMode::HistorySwap => 0.0,
        };
        let confidence = confidence_weight(depth, prev.z, motion_error, ctx.params);

        let source = match self.history_mode {
            HistoryMode::RemapChain => {
                let Some(link) = ctx.remap.nearest(pos) else {
                    return PixelBlend::raw(raw, center);
                };
                if link.z <= 0.0 {
                    return PixelBlend::raw(raw, center);
                }
                let texel_center = position_to_pixel(pos).as_vec2() + Vec2::splat(0.5);
                link.truncate().truncate() + (pos - texel_center)
            }
            HistoryMode::Accumulated | HistoryMode::RawFrame => pos,
        };

        let history = ctx.color.bilinear(source);
        if confidence <= 0.0 || !history.is_finite() {
            return PixelBlend::raw(raw, center);
        }

        PixelBlend {
            estimate: raw * (1.0 - confidence) + history * confidence,
            remap: Vec4::new(source.x, source.y, 1.0, confidence),
            confidence,
            shifted,
        }
    }
}
