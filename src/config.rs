use serde::Deserialize;

/// Size of a raw CD-ROM sector. PSX images are stored in this layout.
pub const RAW_SECTOR_SIZE: u64 = 2352;

/// Every sector of a mode 2 raw image starts with this sync pattern.
pub const MODE2_SYNC: [u8; 12] = [
    0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00,
];

/// Mount point of the disc in the virtual filesystem.
pub const DISC_MOUNT: &str = "disc0:";

/// Working directory for games booted from a disc.
pub const DISC_USER_DIR: &str = "disc0:/PSP_GAME/USRDIR";

/// Virtual root that `PSP/GAME/...` directories on the host map onto.
pub const MEMSTICK_ROOT: &str = "ms0:/";

/// Default number of extra attempts the retry layer makes.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base delay between retry attempts, multiplied by the attempt number.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Chunk size of the on-disk cache (1 MB).
pub const DEFAULT_DISK_CACHE_CHUNK_SIZE: u64 = 1024 * 1024;

/// Block size of the in-memory cache (64 KB).
pub const DEFAULT_MEMORY_CACHE_BLOCK_SIZE: usize = 64 * 1024;

/// Number of blocks the in-memory cache keeps before evicting (4 MB total).
pub const DEFAULT_MEMORY_CACHE_MAX_BLOCKS: usize = 64;

/// Top-level configuration for accessor construction.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Non-interactive run (tests, batch tools). Disables the on-disk cache.
    pub headless: bool,
    /// Directory used for on-disk cache files. Empty means the system temp dir.
    pub cache_dir: String,
    /// Extra attempts made by the retry layer.
    pub max_retries: u32,
    /// Base backoff between retries in milliseconds.
    pub retry_delay_ms: u64,
    /// Size of each on-disk cache chunk in bytes.
    pub disk_cache_chunk_size: u64,
    /// Size of each in-memory cache block in bytes.
    pub memory_cache_block_size: usize,
    /// Maximum number of blocks held by the in-memory cache.
    pub memory_cache_max_blocks: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            headless: false,
            cache_dir: String::new(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            disk_cache_chunk_size: DEFAULT_DISK_CACHE_CHUNK_SIZE,
            memory_cache_block_size: DEFAULT_MEMORY_CACHE_BLOCK_SIZE,
            memory_cache_max_blocks: DEFAULT_MEMORY_CACHE_MAX_BLOCKS,
        }
    }
}

impl LoaderConfig {
    /// Directory the disk cache writes into.
    pub fn cache_dir(&self) -> std::path::PathBuf {
        if self.cache_dir.trim().is_empty() {
            std::env::temp_dir().join("psp_loader_cache")
        } else {
            std::path::PathBuf::from(&self.cache_dir)
        }
    }
}
