// Accessor layer: base sources (local disk, memory, HTTP) and the decorators stacked on them.

pub mod buffer;
pub mod disk_cache;
pub mod http_source;
pub mod local;
pub mod memory_cache;
pub mod retry;
pub mod stats;
pub mod traits;

pub use buffer::BufferAccessor;
pub use disk_cache::DiskCachingAccessor;
pub use http_source::HttpAccessor;
pub use local::LocalAccessor;
pub use memory_cache::CachingAccessor;
pub use retry::RetryingAccessor;
pub use traits::{layers, FileAccessor};
