//! Cross-tick state owned by the filter between frames.

use log::debug;

use crate::core::pool::PooledBuffer;
use crate::error::{FilterError, FilterResult};
use crate::types::{BufferDesc, BufferId};

/// Everything one tick leaves behind for the next.
#[derive(Debug)]
pub struct HistoryState {
    /// Color the next tick reprojects from (blended estimate, raw frame or
    /// key frame, depending on the history mode)
    pub color: PooledBuffer,
    /// Per pixel: xy = reprojected source position, z = chain validity,
    /// w = confidence used this tick
    pub remap: PooledBuffer,
    /// Per pixel: xy = motion, z = depth, w = elapsed time of the tick
    pub motion_depth: PooledBuffer,
    /// Elapsed time of the tick that produced this state
    pub delta_time: f32,
    /// Index of the tick that produced this state
    pub tick: u64,
}

impl HistoryState {
    /// Layout of the color history
    pub fn desc(&self) -> BufferDesc {
        self.color.desc()
    }

    /// Whether a frame with this color layout can reproject from us
    pub fn matches(&self, desc: BufferDesc) -> bool {
        self.desc() == desc
            && self.remap.width() == desc.width
            && self.remap.height() == desc.height
            && self.motion_depth.width() == desc.width
            && self.motion_depth.height() == desc.height
    }

    pub fn buffer_ids(&self) -> [BufferId; 3] {
        [self.color.id(), self.remap.id(), self.motion_depth.id()]
    }

    pub const BUFFER_COUNT: usize = 3;
}

/// Single-owner slot for the current [`HistoryState`].
///
/// `commit` swaps the new state in before the old one is dropped, so the
/// old buffers go back to the pool only once the replacement is complete.
#[derive(Debug, Default)]
pub struct HistoryStore {
    state: Option<HistoryState>,
    tick: u64,
    committed: bool,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a tick; allows exactly one `commit` until the next call.
    pub fn begin_tick(&mut self, tick: u64) {
        self.tick = tick;
        self.committed = false;
    }

    pub fn current(&self) -> Option<&HistoryState> {
        self.state.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_none()
    }

    /// Replace the stored state. The previous state is released after the
    /// swap. A second commit in the same tick is rejected and `next` is
    /// released instead.
    pub fn commit(&mut self, next: HistoryState) -> FilterResult<()> {
        if self.committed {
            return Err(FilterError::DoubleCommit { tick: self.tick });
        }

        let previous = self.state.replace(next);
        self.committed = true;

        if let Some(previous) = previous {
            debug!("history tick {} replaced tick {}", self.tick, previous.tick);
        }

        Ok(())
    }

    /// Drop the stored state, returning its buffers to their pool.
    pub fn clear(&mut self) {
        if let Some(state) = self.state.take() {
            debug!("history from tick {} discarded", state.tick);
        }
    }

    /// Buffers referenced by the live state
    pub fn live_buffers(&self) -> usize {
        if self.state.is_some() {
            HistoryState::BUFFER_COUNT
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pool::{FrameBufferPool, SharedPool};
    use crate::types::PixelFormat;

    fn state(pool: &SharedPool, tick: u64, width: u32) -> HistoryState {
        HistoryState {
            color: pool.acquire(width, 2, PixelFormat::Rgba16Float).unwrap(),
            remap: pool.acquire(width, 2, PixelFormat::Rgba16Float).unwrap(),
            motion_depth: pool.acquire(width, 2, PixelFormat::Rgba16Float).unwrap(),
            delta_time: 0.016,
            tick,
        }
    }

    #[test]
    fn empty_until_first_commit() {
        let pool = FrameBufferPool::shared(4);
        let mut store = HistoryStore::new();
        assert!(store.current().is_none());

        store.begin_tick(0);
        store.commit(state(&pool, 0, 2)).unwrap();
        assert_eq!(store.current().map(|s| s.tick), Some(0));
        assert_eq!(store.live_buffers(), 3);
    }

    #[test]
    fn commit_releases_previous_state() {
        let pool = FrameBufferPool::shared(4);
        let mut store = HistoryStore::new();

        store.begin_tick(0);
        store.commit(state(&pool, 0, 2)).unwrap();
        store.begin_tick(1);
        store.commit(state(&pool, 1, 2)).unwrap();

        let stats = pool.stats();
        assert_eq!(stats.acquired, 6);
        assert_eq!(stats.released, 3);
        assert_eq!(store.current().map(|s| s.tick), Some(1));
    }

    #[test]
    fn double_commit_rejected() {
        let pool = FrameBufferPool::shared(4);
        let mut store = HistoryStore::new();

        store.begin_tick(5);
        store.commit(state(&pool, 5, 2)).unwrap();
        let err = store.commit(state(&pool, 5, 2)).unwrap_err();

        assert!(matches!(err, FilterError::DoubleCommit { tick: 5 }));
        // The rejected state went straight back to the pool.
        assert_eq!(pool.stats().live(), 3);
        assert_eq!(store.current().map(|s| s.tick), Some(5));
    }

    #[test]
    fn clear_returns_buffers() {
        let pool = FrameBufferPool::shared(4);
        let mut store = HistoryStore::new();
        store.begin_tick(0);
        store.commit(state(&pool, 0, 2)).unwrap();

        store.clear();
        assert!(store.is_empty());
        assert_eq!(pool.stats().live(), 0);
    }

    #[test]
    fn matches_checks_layout() {
        let pool = FrameBufferPool::shared(4);
        let history = state(&pool, 0, 4);
        let same = BufferDesc::new(4, 2, PixelFormat::Rgba16Float).unwrap();
        assert!(history.matches(same));
        assert!(!history.matches(same.with_format(PixelFormat::Rgba32Float)));
        assert!(!history.matches(BufferDesc::new(8, 2, PixelFormat::Rgba16Float).unwrap()));
    }
}
