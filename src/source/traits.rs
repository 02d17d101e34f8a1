use crate::path::GamePath;

/// Byte-addressable input: a local file or directory, an in-memory buffer,
/// a remote object, or a decorator around any of those.
///
/// All calls are blocking. Decorators must return exactly the bytes their
/// inner accessor would.
pub trait FileAccessor: Send + Sync {
    fn exists(&self) -> bool;
    fn is_directory(&self) -> bool;
    fn size(&self) -> u64;

    /// Read up to `buf.len()` bytes at `offset`. Returns the number of bytes read;
    /// a short count means end of data or an error recorded in [`latest_error`].
    ///
    /// [`latest_error`]: FileAccessor::latest_error
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize;

    fn path(&self) -> &GamePath;

    /// Text of the most recent low-level failure, empty if none.
    fn latest_error(&self) -> String {
        String::new()
    }

    /// Whether `name` exists inside this directory.
    fn has_child(&self, name: &str) -> bool {
        self.path().join(name).to_path_buf().exists()
    }

    /// Whether `name` exists inside this directory and is itself a directory.
    fn has_child_dir(&self, name: &str) -> bool {
        self.path().join(name).to_path_buf().is_dir()
    }

    /// Short name of this layer, used to inspect how a pipeline was assembled.
    fn layer_name(&self) -> &'static str;

    /// The accessor this one decorates, if any.
    fn inner(&self) -> Option<&dyn FileAccessor> {
        None
    }
}

/// Layer names from the outermost decorator down to the base accessor.
pub fn layers(accessor: &dyn FileAccessor) -> Vec<&'static str> {
    let mut names = vec![accessor.layer_name()];
    let mut current = accessor.inner();
    while let Some(layer) = current {
        names.push(layer.layer_name());
        current = layer.inner();
    }
    names
}

/// Read exactly `N` bytes at `offset`, or `None` on a short read.
pub fn read_array<const N: usize>(accessor: &dyn FileAccessor, offset: u64) -> Option<[u8; N]> {
    let mut buf = [0u8; N];
    if accessor.read_at(offset, &mut buf) == N {
        Some(buf)
    } else {
        None
    }
}

/// Little-endian u32 at `offset`.
pub fn read_u32_le(accessor: &dyn FileAccessor, offset: u64) -> Option<u32> {
    read_array::<4>(accessor, offset).map(u32::from_le_bytes)
}
