// In-memory block cache: the outermost layer for slow sources.

use std::collections::{HashMap, VecDeque};

use bytes::Bytes;
use parking_lot::Mutex;

use super::stats::{CacheStats, CacheStatsSnapshot};
use super::traits::FileAccessor;
use crate::path::GamePath;

#[derive(Default)]
struct BlockMap {
    blocks: HashMap<u64, Bytes>,
    /// Insertion order, oldest first.
    order: VecDeque<u64>,
}

pub struct CachingAccessor {
    inner: Box<dyn FileAccessor>,
    block_size: usize,
    max_blocks: usize,
    blocks: Mutex<BlockMap>,
    stats: CacheStats,
}

impl CachingAccessor {
    pub fn new(inner: Box<dyn FileAccessor>, block_size: usize, max_blocks: usize) -> Self {
        Self {
            inner,
            block_size: block_size.max(1),
            max_blocks: max_blocks.max(1),
            blocks: Mutex::new(BlockMap::default()),
            stats: CacheStats::new(),
        }
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn cached_blocks(&self) -> usize {
        self.blocks.lock().blocks.len()
    }

    /// Return block `index`, reading it from the inner accessor on a miss.
    /// Blocks at the end of the data may be shorter than `block_size`.
    fn block(&self, index: u64) -> (Bytes, bool) {
        if let Some(block) = self.blocks.lock().blocks.get(&index) {
            return (block.clone(), true);
        }

        let mut data = vec![0u8; self.block_size];
        let read = self
            .inner
            .read_at(index * self.block_size as u64, &mut data);
        data.truncate(read);
        let block = Bytes::from(data);
        self.stats.record_fetched(read as u64);

        // Only complete blocks, or the true tail, are worth keeping.
        let block_end = index * self.block_size as u64 + read as u64;
        if read == self.block_size || (read > 0 && block_end == self.inner.size()) {
            let mut map = self.blocks.lock();
            if map.blocks.insert(index, block.clone()).is_none() {
                map.order.push_back(index);
            }
            while map.order.len() > self.max_blocks {
                if let Some(oldest) = map.order.pop_front() {
                    map.blocks.remove(&oldest);
                }
            }
        }
        (block, false)
    }
}

impl FileAccessor for CachingAccessor {
    fn exists(&self) -> bool {
        self.inner.exists()
    }

    fn is_directory(&self) -> bool {
        self.inner.is_directory()
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize {
        let block_size = self.block_size as u64;
        let mut total = 0usize;
        let mut cached = 0u64;

        while total < buf.len() {
            let pos = offset + total as u64;
            let index = pos / block_size;
            let within = (pos % block_size) as usize;

            let (block, hit) = self.block(index);
            if within >= block.len() {
                break;
            }
            let n = (block.len() - within).min(buf.len() - total);
            buf[total..total + n].copy_from_slice(&block[within..within + n]);
            if hit {
                cached += n as u64;
            }
            total += n;

            // A short block means the inner accessor ran out of data.
            if block.len() < self.block_size {
                break;
            }
        }

        self.stats.record_request(total as u64, cached);
        total
    }

    fn path(&self) -> &GamePath {
        self.inner.path()
    }

    fn latest_error(&self) -> String {
        self.inner.latest_error()
    }

    fn has_child(&self, name: &str) -> bool {
        self.inner.has_child(name)
    }

    fn has_child_dir(&self, name: &str) -> bool {
        self.inner.has_child_dir(name)
    }

    fn layer_name(&self) -> &'static str {
        "memory-cache"
    }

    fn inner(&self) -> Option<&dyn FileAccessor> {
        Some(self.inner.as_ref())
    }
}
