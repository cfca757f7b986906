use crate::config::ToneAdjust;
use crate::core::history::HistoryState;
use crate::core::pool::{PooledBuffer, SharedPool};
use crate::core::reprojection::Reprojected;
use crate::math::expose;
use crate::types::TickKind;

/// Turns the reprojection result into the visible output and the state to
/// retain as history.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositionStage {
    tone: Option<ToneAdjust>,
}

impl CompositionStage {
    pub fn new(tone: Option<ToneAdjust>) -> Self {
        Self { tone }
    }

    /// Copy the estimate into a fresh output buffer and move the carried
    /// buffers into a new [`HistoryState`]. The tone pass only touches the
    /// output of update ticks; a reset tick shows the raw frame unchanged.
    pub fn compose(
        &self,
        pool: &SharedPool,
        reprojected: Reprojected,
        kind: TickKind,
        delta_time: f32,
        tick: u64,
    ) -> (PooledBuffer, HistoryState) {
        let Reprojected {
            estimate,
            history_color,
            remap,
            motion_depth,
            ..
        } = reprojected;

        let mut output = pool.acquire_desc(estimate.desc());
        output.copy_from(estimate.pixels());

        if let (Some(tone), TickKind::Update) = (self.tone, kind) {
            for pixel in output.pixels_mut() {
                *pixel = expose(*pixel, tone.exposure, tone.clamp_negative);
            }
        }

        // Without a separate history color the estimate itself is retained.
        let color = history_color.unwrap_or(estimate);

        let next = HistoryState {
            color,
            remap,
            motion_depth,
            delta_time,
            tick,
        };

        (output, next)
    }
}
