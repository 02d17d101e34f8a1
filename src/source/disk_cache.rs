// On-disk disc cache: a memory-mapped file the size of the remote object plus a fill map.

use std::collections::hash_map::DefaultHasher;
use std::fs::{self, OpenOptions};
use std::hash::{Hash, Hasher};
use std::ops::{Range, RangeInclusive};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use anyhow::{anyhow, bail, Result};
use bitvec::prelude::*;
use memmap2::MmapMut;
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::stats::{CacheStats, CacheStatsSnapshot};
use super::traits::FileAccessor;
use crate::path::GamePath;

static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(0);

/// Mapped bytes and which chunks of them hold real data. One lock guards both
/// so a reader never sees a chunk marked filled before its bytes land.
struct Slots {
    map: MmapMut,
    filled: BitVec,
}

/// Fixed-size chunk store backed by a sparse file in the cache directory.
///
/// The file is deleted when the cache is dropped.
pub struct DiskCache {
    slots: RwLock<Slots>,
    chunk_size: u64,
    len: u64,
    path: PathBuf,
}

impl DiskCache {
    /// Map a fresh `<key>.cache` file of `len` bytes under `dir`.
    pub fn create(dir: &Path, key: &str, len: u64, chunk_size: u64) -> Result<Self> {
        if len == 0 || chunk_size == 0 {
            bail!("cannot cache {} bytes in chunks of {}", len, chunk_size);
        }
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.cache", key));

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        file.set_len(len)?;

        // SAFETY: the file was just truncated and is private to this cache.
        let map = unsafe { MmapMut::map_mut(&file)? };
        let chunks = len.div_ceil(chunk_size) as usize;

        Ok(Self {
            slots: RwLock::new(Slots {
                map,
                filled: bitvec![0; chunks],
            }),
            chunk_size,
            len,
            path,
        })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn chunk_count(&self) -> usize {
        self.slots.read().filled.len()
    }

    pub fn file_path(&self) -> &Path {
        &self.path
    }

    /// Byte span of chunk `index`; the last one is cut at the end of the data.
    pub fn chunk_span(&self, index: usize) -> Range<u64> {
        let start = (index as u64 * self.chunk_size).min(self.len);
        start..(start + self.chunk_size).min(self.len)
    }

    /// Chunks overlapping `[start, end)`. `end` must be past `start`.
    pub fn chunks_covering(&self, start: u64, end: u64) -> RangeInclusive<usize> {
        (start / self.chunk_size) as usize..=((end - 1) / self.chunk_size) as usize
    }

    pub fn is_filled(&self, index: usize) -> bool {
        self.slots.read().filled.get(index).is_some_and(|bit| *bit)
    }

    /// Store the full contents of chunk `index`.
    pub fn fill(&self, index: usize, data: &[u8]) -> Result<()> {
        if index >= self.chunk_count() {
            bail!("chunk {} past the end of {}", index, self.path.display());
        }
        let span = self.chunk_span(index);
        if data.len() as u64 != span.end - span.start {
            return Err(anyhow!(
                "chunk {} needs {} bytes, got {}",
                index,
                span.end - span.start,
                data.len()
            ));
        }

        let mut slots = self.slots.write();
        slots.map[span.start as usize..span.end as usize].copy_from_slice(data);
        slots.filled.set(index, true);
        Ok(())
    }

    /// Copy `[offset, offset + buf.len())` out of the cache. Fails unless every
    /// chunk it touches is filled.
    pub fn copy_out(&self, offset: u64, buf: &mut [u8]) -> bool {
        let end = offset + buf.len() as u64;
        if buf.is_empty() || end > self.len {
            return false;
        }
        let slots = self.slots.read();
        if self.chunks_covering(offset, end).any(|i| !slots.filled[i]) {
            return false;
        }
        buf.copy_from_slice(&slots.map[offset as usize..end as usize]);
        true
    }
}

impl Drop for DiskCache {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            debug!("could not remove {}: {}", self.path.display(), e);
        }
    }
}

/// Cache file name for a source path: a hash of the path plus a per-process id.
fn cache_key(path: &GamePath) -> String {
    let mut hasher = DefaultHasher::new();
    path.as_str().hash(&mut hasher);
    format!(
        "{:016x}-{}-{}",
        hasher.finish(),
        std::process::id(),
        NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed)
    )
}

/// Decorator that keeps every chunk it has read in a [`DiskCache`].
///
/// The cache file is created on the first read, sized to the inner accessor.
/// When it cannot be created, reads go straight to the inner accessor.
pub struct DiskCachingAccessor {
    inner: Box<dyn FileAccessor>,
    cache_dir: PathBuf,
    chunk_size: u64,
    cache: OnceLock<Option<DiskCache>>,
    stats: CacheStats,
}

impl DiskCachingAccessor {
    pub fn new(inner: Box<dyn FileAccessor>, cache_dir: PathBuf, chunk_size: u64) -> Self {
        Self {
            inner,
            cache_dir,
            chunk_size,
            cache: OnceLock::new(),
            stats: CacheStats::new(),
        }
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    fn cache(&self) -> Option<&DiskCache> {
        self.cache
            .get_or_init(|| {
                let key = cache_key(self.inner.path());
                match DiskCache::create(&self.cache_dir, &key, self.inner.size(), self.chunk_size) {
                    Ok(cache) => {
                        debug!(
                            "disk cache for {} at {} ({} chunks)",
                            self.inner.path(),
                            cache.file_path().display(),
                            cache.chunk_count()
                        );
                        Some(cache)
                    }
                    Err(e) => {
                        warn!("disk cache unavailable for {}: {}", self.inner.path(), e);
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Pull one chunk from the inner accessor into the cache.
    fn fill_chunk(&self, cache: &DiskCache, index: usize) -> bool {
        let span = cache.chunk_span(index);
        let mut data = vec![0u8; (span.end - span.start) as usize];
        let read = self.inner.read_at(span.start, &mut data);
        if read != data.len() {
            debug!(
                "chunk {} of {} short read ({} of {} bytes)",
                index,
                self.inner.path(),
                read,
                data.len()
            );
            return false;
        }
        self.stats.record_fetched(read as u64);
        match cache.fill(index, &data) {
            Ok(()) => true,
            Err(e) => {
                warn!("disk cache write failed: {}", e);
                false
            }
        }
    }
}

impl FileAccessor for DiskCachingAccessor {
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
        let Some(cache) = self.cache() else {
            return self.inner.read_at(offset, buf);
        };
        if buf.is_empty() || offset >= cache.len() {
            return 0;
        }

        let end = (offset + buf.len() as u64).min(cache.len());
        let requested = end - offset;
        let mut cached = 0u64;
        for i in cache.chunks_covering(offset, end) {
            if cache.is_filled(i) {
                let span = cache.chunk_span(i);
                cached += span.end.min(end) - span.start.max(offset);
            } else if !self.fill_chunk(cache, i) {
                return self.inner.read_at(offset, buf);
            }
        }
        self.stats.record_request(requested, cached);

        let out = &mut buf[..requested as usize];
        if cache.copy_out(offset, out) {
            out.len()
        } else {
            self.inner.read_at(offset, buf)
        }
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
        "disk-cache"
    }

    fn inner(&self) -> Option<&dyn FileAccessor> {
        Some(self.inner.as_ref())
    }
}
