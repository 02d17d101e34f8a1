use bytes::Bytes;

use super::traits::FileAccessor;
use crate::path::GamePath;

/// Accessor backed by an in-memory buffer.
#[derive(Debug, Clone)]
pub struct BufferAccessor {
    path: GamePath,
    data: Bytes,
}

impl BufferAccessor {
    /// Create a buffer accessor that reports `path` as its location.
    ///
    /// ## Arguments
    /// * `path` - Name the buffer answers to; drives extension checks
    /// * `data` - The bytes to serve
    pub fn new(path: impl Into<GamePath>, data: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }
}

impl FileAccessor for BufferAccessor {
    fn exists(&self) -> bool {
        true
    }

    fn is_directory(&self) -> bool {
        false
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize {
        let len = self.data.len() as u64;
        if offset >= len {
            return 0;
        }
        let start = offset as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        n
    }

    fn path(&self) -> &GamePath {
        &self.path
    }

    fn has_child(&self, _name: &str) -> bool {
        false
    }

    fn has_child_dir(&self, _name: &str) -> bool {
        false
    }

    fn layer_name(&self) -> &'static str {
        "buffer"
    }
}
