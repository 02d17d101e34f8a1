// Retry decorator: re-issues failed or short reads against a flaky source.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::traits::FileAccessor;
use crate::path::GamePath;

pub struct RetryingAccessor {
    inner: Box<dyn FileAccessor>,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl RetryingAccessor {
    pub fn new(inner: Box<dyn FileAccessor>, max_retries: u32, retry_delay_ms: u64) -> Self {
        Self {
            inner,
            max_retries,
            retry_delay_ms,
        }
    }

    fn backoff(&self, attempt: u32) {
        if self.retry_delay_ms > 0 {
            thread::sleep(Duration::from_millis(
                self.retry_delay_ms * (attempt as u64 + 1),
            ));
        }
    }
}

impl FileAccessor for RetryingAccessor {
    fn exists(&self) -> bool {
        for attempt in 0..=self.max_retries {
            if self.inner.exists() {
                return true;
            }
            if attempt < self.max_retries {
                debug!("exists check failed for {} (attempt {})", self.inner.path(), attempt);
                self.backoff(attempt);
            }
        }
        false
    }

    fn is_directory(&self) -> bool {
        self.inner.is_directory()
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize {
        let size = self.inner.size();
        // Never ask for more than the source holds, so a short read is a real failure.
        let wanted = if offset >= size {
            0
        } else {
            buf.len().min((size - offset) as usize)
        };
        if wanted == 0 {
            return self.inner.read_at(offset, buf);
        }

        let mut total = self.inner.read_at(offset, &mut buf[..wanted]);
        let mut attempt = 0;
        while total < wanted && attempt < self.max_retries {
            warn!(
                "short read from {} at offset {} ({} of {} bytes, attempt {})",
                self.inner.path(),
                offset,
                total,
                wanted,
                attempt
            );
            self.backoff(attempt);
            total += self
                .inner
                .read_at(offset + total as u64, &mut buf[total..wanted]);
            attempt += 1;
        }
        if total < wanted {
            warn!(
                "read from {} at offset {} failed after {} retries",
                self.inner.path(),
                offset,
                self.max_retries
            );
        }
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
        "retry"
    }

    fn inner(&self) -> Option<&dyn FileAccessor> {
        Some(self.inner.as_ref())
    }
}
