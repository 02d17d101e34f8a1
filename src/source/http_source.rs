use anyhow::{anyhow, Result};
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::traits::FileAccessor;
use crate::path::GamePath;

#[derive(Debug, Clone, Copy)]
struct SourceInfo {
    content_length: u64,
    supports_range: bool,
}

/// Accessor for a remote object served over HTTP range requests.
///
/// Nothing touches the network until the first query. A successful probe is
/// kept for the lifetime of the accessor; a failed one is sent again on the
/// next query.
pub struct HttpAccessor {
    path: GamePath,
    client: Client,
    info: Mutex<Option<SourceInfo>>,
    latest_error: Mutex<String>,
}

impl HttpAccessor {
    pub fn new(path: GamePath) -> Self {
        Self {
            path,
            client: Client::new(),
            info: Mutex::new(None),
            latest_error: Mutex::new(String::new()),
        }
    }

    fn build_request(&self, range_header: &str) -> RequestBuilder {
        self.client
            .get(self.path.as_str())
            .header("Range", range_header)
    }

    fn is_auth_rejection(status: StatusCode) -> bool {
        matches!(status.as_u16(), 401 | 403 | 412)
    }

    fn probe(&self) -> Result<SourceInfo> {
        let resp = self.build_request("bytes=0-0").send()?;

        let status = resp.status();
        debug!("http probe status={} url={}", status.as_u16(), self.path);
        if Self::is_auth_rejection(status) {
            warn!("http probe auth rejected status={}", status.as_u16());
            return Err(anyhow!("auth_rejected: HTTP {}", status.as_u16()));
        }
        if !status.is_success() {
            warn!("http probe failed status={}", status.as_u16());
            return Err(anyhow!("probe failed: HTTP {}", status.as_u16()));
        }

        // Content-Range: bytes 0-0/<total>
        let supports_range = status == StatusCode::PARTIAL_CONTENT;
        let content_length = if supports_range {
            resp.headers()
                .get("content-range")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.rsplit('/').next())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0)
        } else {
            resp.headers()
                .get("content-length")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0)
        };

        Ok(SourceInfo {
            content_length,
            supports_range,
        })
    }

    fn info(&self) -> Option<SourceInfo> {
        if let Some(info) = *self.info.lock() {
            return Some(info);
        }
        match self.probe() {
            Ok(info) => {
                *self.info.lock() = Some(info);
                Some(info)
            }
            Err(e) => {
                *self.latest_error.lock() = e.to_string();
                None
            }
        }
    }

    /// Fetch the inclusive byte range `[start, end]`.
    fn fetch_range(&self, start: u64, end: u64, supports_range: bool) -> Result<Bytes> {
        let range = format!("bytes={}-{}", start, end);
        let resp = self.build_request(&range).send()?;

        let status = resp.status();
        if Self::is_auth_rejection(status) {
            warn!("http fetch auth rejected status={} range={}", status.as_u16(), range);
            return Err(anyhow!("auth_rejected: HTTP {}", status.as_u16()));
        }
        if !status.is_success() {
            warn!("http fetch failed status={} range={}", status.as_u16(), range);
            return Err(anyhow!("fetch_range failed: HTTP {}", status.as_u16()));
        }

        let bytes = resp.bytes()?;
        if supports_range && status == StatusCode::PARTIAL_CONTENT {
            return Ok(bytes);
        }

        // Server ignored the Range header and sent the whole object.
        let len = bytes.len() as u64;
        let from = start.min(len) as usize;
        let to = (end + 1).min(len) as usize;
        Ok(bytes.slice(from..to))
    }
}

impl FileAccessor for HttpAccessor {
    fn exists(&self) -> bool {
        self.info().is_some()
    }

    fn is_directory(&self) -> bool {
        false
    }

    fn size(&self) -> u64 {
        self.info().map(|info| info.content_length).unwrap_or(0)
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize {
        let Some(info) = self.info() else {
            return 0;
        };
        if buf.is_empty() || offset >= info.content_length {
            return 0;
        }
        let end = (offset + buf.len() as u64).min(info.content_length) - 1;

        match self.fetch_range(offset, end, info.supports_range) {
            Ok(data) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                n
            }
            Err(e) => {
                *self.latest_error.lock() = e.to_string();
                0
            }
        }
    }

    fn path(&self) -> &GamePath {
        &self.path
    }

    fn latest_error(&self) -> String {
        self.latest_error.lock().clone()
    }

    fn has_child(&self, _name: &str) -> bool {
        false
    }

    fn has_child_dir(&self, _name: &str) -> bool {
        false
    }

    fn layer_name(&self) -> &'static str {
        "http"
    }
}
