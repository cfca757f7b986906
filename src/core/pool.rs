// Buffer pool for reusing per-tick image allocations across frames

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use glam::Vec4;
use log::{debug, trace};
use parking_lot::Mutex;

use crate::error::FilterResult;
use crate::math::ImageView;
use crate::types::{BufferDesc, BufferId, PixelFormat};

/// Pool shared between filter instances
pub type SharedPool = Arc<FrameBufferPool>;

/// Pool statistics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct PoolStats {
    pub acquired: u64,
    pub released: u64,
    pub hits: u64,
    pub misses: u64,
    pub idle_buffers: usize,
    pub idle_bytes: u64,
}

impl PoolStats {
    /// Buffers currently owned outside the pool
    pub fn live(&self) -> u64 {
        self.acquired - self.released
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct PoolState {
    idle: HashMap<BufferDesc, Vec<Vec<Vec4>>>,
    stats: PoolStats,
}

/// Allocator for transient image buffers.
///
/// Buffers are handed out by value. Dropping a [`PooledBuffer`] gives its
/// storage back, so a tick that bails out early cannot leak.
pub struct FrameBufferPool {
    state: Mutex<PoolState>,
    next_id: AtomicU64,
    max_idle_per_desc: usize,
}

impl FrameBufferPool {
    pub fn new(max_idle_per_desc: usize) -> Self {
        Self {
            state: Mutex::new(PoolState::default()),
            next_id: AtomicU64::new(1),
            max_idle_per_desc,
        }
    }

    pub fn shared(max_idle_per_desc: usize) -> SharedPool {
        Arc::new(Self::new(max_idle_per_desc))
    }

    /// Acquire a buffer from the pool or create a new one.
    /// Contents are unspecified; callers overwrite every pixel.
    pub fn acquire(
        self: &Arc<Self>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> FilterResult<PooledBuffer> {
        let desc = BufferDesc::new(width, height, format)?;
        Ok(self.acquire_desc(desc))
    }

    /// Acquire with an already validated descriptor
    pub fn acquire_desc(self: &Arc<Self>, desc: BufferDesc) -> PooledBuffer {
        let id = BufferId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let recycled = {
            let mut state = self.state.lock();
            state.stats.acquired += 1;
            let recycled = state.idle.get_mut(&desc).and_then(Vec::pop);
            match recycled {
                Some(ref storage) => {
                    state.stats.hits += 1;
                    state.stats.idle_buffers -= 1;
                    state.stats.idle_bytes -= desc.byte_size();
                    trace!("pool hit {:?} -> {:?} ({} px)", desc, id, storage.len());
                }
                None => {
                    state.stats.misses += 1;
                    trace!("pool miss {:?} -> {:?}", desc, id);
                }
            }
            recycled
        };

        let data = recycled.unwrap_or_else(|| vec![Vec4::ZERO; desc.pixel_count()]);

        PooledBuffer {
            id,
            desc,
            data,
            pool: Arc::downgrade(self),
        }
    }

    /// Return a buffer. Equivalent to dropping it.
    pub fn release(&self, buffer: PooledBuffer) {
        drop(buffer);
    }

    fn recycle(&self, desc: BufferDesc, data: Vec<Vec4>) {
        let mut state = self.state.lock();
        state.stats.released += 1;

        let max_idle = self.max_idle_per_desc;
        let idle = state.idle.entry(desc).or_default();
        if idle.len() < max_idle {
            idle.push(data);
            state.stats.idle_buffers += 1;
            state.stats.idle_bytes += desc.byte_size();
        }
    }

    /// Free every idle buffer
    pub fn trim(&self) {
        let mut state = self.state.lock();
        let freed = state.stats.idle_buffers;
        state.idle.clear();
        state.stats.idle_buffers = 0;
        state.stats.idle_bytes = 0;
        debug!("pool trimmed, {} idle buffers freed", freed);
    }

    pub fn stats(&self) -> PoolStats {
        self.state.lock().stats
    }
}

impl Default for FrameBufferPool {
    fn default() -> Self {
        Self::new(4)
    }
}

/// Image buffer owned by exactly one party: the pool, a tick in flight,
/// the history store, or the caller holding a tick's output.
pub struct PooledBuffer {
    id: BufferId,
    desc: BufferDesc,
    data: Vec<Vec4>,
    pool: Weak<FrameBufferPool>,
}

impl PooledBuffer {
    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn desc(&self) -> BufferDesc {
        self.desc
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn format(&self) -> PixelFormat {
        self.desc.format
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [Vec4] {
        &mut self.data
    }

    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        self.data[y as usize * self.desc.width as usize + x as usize]
    }

    pub fn view(&self) -> ImageView<'_> {
        ImageView::new(self.desc.width, self.desc.height, &self.data)
    }

    /// Overwrite from a slice of identical length
    pub fn copy_from(&mut self, pixels: &[Vec4]) {
        self.data.copy_from_slice(pixels);
    }

    /// Raw little-endian f32 bytes, four lanes per pixel
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

impl std::fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("id", &self.id)
            .field("desc", &self.desc)
            .finish()
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.upgrade() {
            pool.recycle(self.desc, std::mem::take(&mut self.data));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;

    #[test]
    fn acquire_rejects_zero_extent() {
        let pool = FrameBufferPool::shared(4);
        assert!(matches!(
            pool.acquire(0, 8, PixelFormat::Rgba16Float),
            Err(FilterError::InvalidDimensions { .. })
        ));
        assert_eq!(pool.stats().acquired, 0);
    }

    #[test]
    fn drop_returns_storage() {
        let pool = FrameBufferPool::shared(4);
        let buffer = pool.acquire(4, 4, PixelFormat::Rgba16Float).unwrap();
        assert_eq!(buffer.pixels().len(), 16);
        assert_eq!(pool.stats().live(), 1);

        drop(buffer);
        let stats = pool.stats();
        assert_eq!(stats.live(), 0);
        assert_eq!(stats.idle_buffers, 1);
        assert_eq!(stats.idle_bytes, 16 * 8);
    }

    #[test]
    fn recycles_matching_desc_only() {
        let pool = FrameBufferPool::shared(4);
        let first = pool.acquire(4, 4, PixelFormat::Rgba16Float).unwrap();
        let first_id = first.id();
        pool.release(first);

        let other = pool.acquire(4, 4, PixelFormat::Rgba32Float).unwrap();
        let again = pool.acquire(4, 4, PixelFormat::Rgba16Float).unwrap();

        let stats = pool.stats();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 1);
        assert_ne!(again.id(), first_id);
        assert_ne!(other.id(), again.id());
    }

    #[test]
    fn idle_list_is_bounded() {
        let pool = FrameBufferPool::shared(1);
        let a = pool.acquire(2, 2, PixelFormat::Rgba16Float).unwrap();
        let b = pool.acquire(2, 2, PixelFormat::Rgba16Float).unwrap();
        drop(a);
        drop(b);

        let stats = pool.stats();
        assert_eq!(stats.released, 2);
        assert_eq!(stats.idle_buffers, 1);
    }

    #[test]
    fn trim_frees_idle() {
        let pool = FrameBufferPool::shared(4);
        drop(pool.acquire(2, 2, PixelFormat::Rgba16Float).unwrap());
        pool.trim();
        assert_eq!(pool.stats().idle_buffers, 0);
        assert_eq!(pool.stats().idle_bytes, 0);
    }

    #[test]
    fn buffer_outliving_pool_is_freed() {
        let pool = FrameBufferPool::shared(4);
        let buffer = pool.acquire(2, 2, PixelFormat::Rgba16Float).unwrap();
        drop(pool);
        assert_eq!(buffer.as_bytes().len(), 4 * 16);
        drop(buffer);
    }
}
