use std::fs::{self, File};
use std::io::{ErrorKind, Read, Seek, SeekFrom};

use parking_lot::Mutex;
use tracing::debug;

use super::traits::FileAccessor;
use crate::path::GamePath;

/// Plain accessor over a file or directory on the local filesystem.
pub struct LocalAccessor {
    path: GamePath,
    file: Option<Mutex<File>>,
    size: u64,
    exists: bool,
    is_directory: bool,
    latest_error: Mutex<String>,
}

impl LocalAccessor {
    pub fn new(path: GamePath) -> Self {
        let mut latest_error = String::new();
        let (exists, is_directory, size) = match fs::metadata(path.to_path_buf()) {
            Ok(meta) => (true, meta.is_dir(), if meta.is_dir() { 0 } else { meta.len() }),
            Err(e) => {
                debug!("local accessor stat failed path={} err={}", path, e);
                latest_error = e.to_string();
                (false, false, 0)
            }
        };

        let file = if exists && !is_directory {
            match File::open(path.to_path_buf()) {
                Ok(f) => Some(Mutex::new(f)),
                Err(e) => {
                    latest_error = e.to_string();
                    None
                }
            }
        } else {
            None
        };

        Self {
            path,
            file,
            size,
            exists,
            is_directory,
            latest_error: Mutex::new(latest_error),
        }
    }

    fn record_error(&self, e: std::io::Error) {
        *self.latest_error.lock() = e.to_string();
    }
}

impl FileAccessor for LocalAccessor {
    fn exists(&self) -> bool {
        self.exists
    }

    fn is_directory(&self) -> bool {
        self.is_directory
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize {
        let Some(file) = &self.file else {
            return 0;
        };
        let mut file = file.lock();
        if let Err(e) = file.seek(SeekFrom::Start(offset)) {
            self.record_error(e);
            return 0;
        }

        let mut total = 0;
        while total < buf.len() {
            match file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.record_error(e);
                    break;
                }
            }
        }
        total
    }

    fn path(&self) -> &GamePath {
        &self.path
    }

    fn latest_error(&self) -> String {
        self.latest_error.lock().clone()
    }

    fn layer_name(&self) -> &'static str {
        "local"
    }
}
