//! Per-tick state machine driving the pool, the stages and the history.

use log::{debug, info};
use serde::Serialize;

use crate::config::{BlendParameters, FilterConfig};
use crate::core::composition::CompositionStage;
use crate::core::history::HistoryStore;
use crate::core::pool::{FrameBufferPool, PooledBuffer, SharedPool};
use crate::core::reprojection::{BlendStats, ReprojectionStage};
use crate::error::FilterResult;
use crate::frame::Frame;
use crate::types::{BufferDesc, ResetReason, TickKind};

/// Monotonic tick index; a tick is a reset when `index % interval == 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleCounter {
    value: u64,
}

impl SampleCounter {
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Reset decision for the current index; intervals below 1 act as 1
    pub fn is_reset(&self, interval: u64) -> bool {
        self.value % interval.max(1) == 0
    }

    pub fn advance(&mut self) {
        self.value += 1;
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickReport {
    pub index: u64,
    pub kind: TickKind,
    pub reason: Option<ResetReason>,
    pub blend: BlendStats,
}

/// Visible result of a tick. Dropping `image` returns it to the pool.
#[derive(Debug)]
pub struct TickOutput {
    pub image: PooledBuffer,
    pub report: TickReport,
}

/// Temporal reprojection filter: feed it one [`Frame`] per rendered frame.
pub struct TemporalFilter {
    config: FilterConfig,
    pool: SharedPool,
    history: HistoryStore,
    reprojection: ReprojectionStage,
    composition: CompositionStage,
    counter: SampleCounter,
    reset_requested: bool,
}

impl TemporalFilter {
    /// Filter with a private pool
    pub fn new(config: FilterConfig) -> Self {
        let pool = FrameBufferPool::shared(config.max_idle_buffers);
        Self::with_pool(config, pool)
    }

    /// Filter drawing its buffers from a pool shared with other instances
    pub fn with_pool(config: FilterConfig, pool: SharedPool) -> Self {
        Self {
            reprojection: ReprojectionStage::new(config.mode, config.history),
            composition: CompositionStage::new(config.tone),
            config,
            pool,
            history: HistoryStore::new(),
            counter: SampleCounter::default(),
            reset_requested: false,
        }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn pool(&self) -> &SharedPool {
        &self.pool
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Index the next tick will get
    pub fn tick_index(&self) -> u64 {
        self.counter.value()
    }

    /// Replace the stored parameters used by [`TemporalFilter::process`].
    /// History stays valid.
    pub fn set_params(&mut self, params: BlendParameters) {
        self.config.params = params;
    }

    /// Make the next tick a reset, e.g. after a camera cut
    pub fn reset_history(&mut self) {
        self.reset_requested = true;
    }

    /// Run one tick with the stored parameters
    pub fn process(&mut self, frame: &Frame) -> FilterResult<TickOutput> {
        let params = self.config.params;
        self.tick(frame, &params)
    }

    /// Run one tick.
    ///
    /// The reset decision uses `params.sample_interval` as passed for this
    /// very tick. The counter advances once the output exists, then the new
    /// history is committed.
    pub fn tick(&mut self, frame: &Frame, params: &BlendParameters) -> FilterResult<TickOutput> {
        let params = params.sanitized();
        let index = self.counter.value();
        let desc = BufferDesc::new(frame.width(), frame.height(), frame.format())?;

        self.history.begin_tick(index);

        let reason = self.reset_reason(desc, params.interval());
        let kind = if reason.is_some() { TickKind::Reset } else { TickKind::Update };

        match reason {
            Some(ResetReason::LayoutChanged) => {
                info!("tick {}: frame layout changed to {:?}, history reset", index, desc)
            }
            Some(reason) => debug!("tick {}: reset ({:?})", index, reason),
            None => debug!("tick {}: update", index),
        }

        let history = match kind {
            TickKind::Update => self.history.current(),
            TickKind::Reset => None,
        };

        let reprojected = self.reprojection.run(&self.pool, frame, history, &params);
        let blend = reprojected.stats;
        let (image, next) = self
            .composition
            .compose(&self.pool, reprojected, kind, frame.delta_time(), index);

        self.counter.advance();
        self.reset_requested = false;
        self.history.commit(next)?;

        Ok(TickOutput {
            image,
            report: TickReport {
                index,
                kind,
                reason,
                blend,
            },
        })
    }

    fn reset_reason(&self, desc: BufferDesc, interval: u64) -> Option<ResetReason> {
        match self.history.current() {
            None => Some(ResetReason::NoHistory),
            Some(state) if !state.matches(desc) => Some(ResetReason::LayoutChanged),
            Some(_) if self.reset_requested => Some(ResetReason::Requested),
            Some(_) if self.counter.is_reset(interval) => Some(ResetReason::Interval),
            Some(_) => None,
        }
    }

    /// Release the history and every idle pooled buffer
    pub fn shutdown(&mut self) {
        info!("temporal filter shut down after {} ticks", self.counter.value());
        self.history.clear();
        self.pool.trim();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};

    fn frame(value: f32) -> Frame {
        Frame::uniform(4, 4, Vec4::splat(value), Vec2::ZERO, 1.0, 1.0 / 60.0).unwrap()
    }

    #[test]
    fn counter_reset_schedule() {
        let mut counter = SampleCounter::default();
        let mut resets = Vec::new();
        for _ in 0..7 {
            resets.push(counter.is_reset(3));
            counter.advance();
        }
        assert_eq!(resets, vec![true, false, false, true, false, false, true]);
    }

    #[test]
    fn counter_treats_zero_interval_as_one() {
        let counter = SampleCounter { value: 5 };
        assert!(counter.is_reset(0));
    }

    #[test]
    fn first_tick_has_no_history() {
        let mut filter = TemporalFilter::new(FilterConfig::default());
        let out = filter.process(&frame(0.3)).unwrap();
        assert_eq!(out.report.kind, TickKind::Reset);
        assert_eq!(out.report.reason, Some(ResetReason::NoHistory));
        assert_eq!(filter.tick_index(), 1);
    }

    #[test]
    fn requested_reset_applies_once() {
        let mut filter = TemporalFilter::new(FilterConfig::default());
        filter.process(&frame(0.1)).unwrap();
        filter.reset_history();

        let reset = filter.process(&frame(0.2)).unwrap();
        assert_eq!(reset.report.reason, Some(ResetReason::Requested));
        let update = filter.process(&frame(0.3)).unwrap();
        assert_eq!(update.report.kind, TickKind::Update);
    }

    #[test]
    fn shutdown_releases_everything() {
        let mut filter = TemporalFilter::new(FilterConfig::default());
        for i in 0..3 {
            filter.process(&frame(i as f32)).unwrap();
        }
        filter.shutdown();

        let stats = filter.pool().stats();
        assert_eq!(stats.live(), 0);
        assert_eq!(stats.idle_buffers, 0);
        assert!(filter.history().is_empty());
    }
}
