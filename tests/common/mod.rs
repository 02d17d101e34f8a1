// Shared fixtures: a recording host and builders for game files on disk.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};

use psp_loader::api::simple::init_logging;
use psp_loader::detect::pbp::build_pbp;
use psp_loader::detect::sfo::{build_sfo, SfoValue};
use psp_loader::source::BufferAccessor;
use psp_loader::{FactoryRegistry, FileAccessor, GamePath, Host, LoaderConfig, PipelineBuilder, Session};

/// Host that records every call instead of emulating anything.
#[derive(Default)]
pub struct RecordingHost {
    pub disc_mounted: bool,
    pub fail_load: bool,
    pub fail_reinit: bool,
    pub calls: Vec<String>,
    pub starting_dir: Option<String>,
}

impl RecordingHost {
    pub fn with_disc() -> Self {
        Self {
            disc_mounted: true,
            ..Self::default()
        }
    }

    fn routine(&mut self, name: &str, file: &dyn FileAccessor) -> Result<()> {
        self.calls.push(format!("{}:{}", name, file.path()));
        if self.fail_load {
            return Err(anyhow!("{} rejected {}", name, file.path()));
        }
        Ok(())
    }

    pub fn called(&self, name: &str) -> bool {
        self.calls.iter().any(|c| c.starts_with(&format!("{}:", name)))
    }
}

impl Host for RecordingHost {
    fn set_starting_directory(&mut self, path: &str) {
        self.calls.push(format!("cwd:{}", path));
        self.starting_dir = Some(path.to_string());
    }

    fn has_mounted_system(&self, prefix: &str) -> bool {
        self.disc_mounted && prefix == "disc0:"
    }

    fn init_memory_for_game_iso(&mut self, disc: &dyn FileAccessor) -> Result<()> {
        self.calls.push(format!("init_memory:{}", disc.path()));
        Ok(())
    }

    fn reinit_memory_for_game_iso(&mut self, disc: &dyn FileAccessor) -> Result<()> {
        self.calls.push(format!("reinit_memory:{}", disc.path()));
        if self.fail_reinit {
            return Err(anyhow!("out of guest memory"));
        }
        Ok(())
    }

    fn load_elf_pbp(&mut self, file: &dyn FileAccessor) -> Result<()> {
        self.routine("load_elf_pbp", file)
    }

    fn load_disc(&mut self, disc: &dyn FileAccessor) -> Result<()> {
        self.routine("load_disc", disc)
    }

    fn load_ge_dump(&mut self, dump: &dyn FileAccessor) -> Result<()> {
        self.routine("load_ge_dump", dump)
    }
}

pub fn test_config() -> LoaderConfig {
    LoaderConfig {
        headless: true,
        retry_delay_ms: 0,
        ..LoaderConfig::default()
    }
}

pub fn builder() -> PipelineBuilder {
    PipelineBuilder::new(Arc::new(FactoryRegistry::new()), test_config())
}

pub fn session(host: RecordingHost) -> Session<RecordingHost> {
    init_logging();
    Session::new(host, builder())
}

/// A PBP whose PARAM.SFO has the given CATEGORY and whose DATA.PSAR starts with `psar`.
pub fn pbp_bytes(category: &str, psar: &[u8]) -> Vec<u8> {
    let sfo = build_sfo(&[
        ("CATEGORY", SfoValue::Text(category.to_string())),
        ("TITLE", SfoValue::Text("Test Title".to_string())),
    ]);
    build_pbp(&[&sfo, b"", b"", b"", b"", b"", b"\x7FELF\x01\x01\x01\x00", psar])
}

pub fn elf_bytes() -> Vec<u8> {
    let mut data = b"\x7FELF\x01\x01\x01\x00".to_vec();
    data.resize(64, 0);
    data
}

/// A disc image with the PVD identifier at sector 16, nothing else.
pub fn iso_bytes() -> Vec<u8> {
    let mut data = vec![0u8; 2048 * 17];
    data[16 * 2048 + 1..16 * 2048 + 6].copy_from_slice(b"CD001");
    data
}

pub fn write_file(dir: &Path, relative: &str, data: &[u8]) -> GamePath {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, data).unwrap();
    game_path(&path)
}

pub fn make_dir(dir: &Path, relative: &str) -> GamePath {
    let path = dir.join(relative);
    fs::create_dir_all(&path).unwrap();
    game_path(&path)
}

pub fn game_path(path: &Path) -> GamePath {
    GamePath::new(path.to_string_lossy().into_owned())
}

/// In-memory accessor that counts reads and fails the first `failures` of them.
pub struct FlakyAccessor {
    inner: BufferAccessor,
    failures: AtomicUsize,
    pub reads: AtomicUsize,
    pub exists_checks: AtomicUsize,
}

impl FlakyAccessor {
    pub fn new(path: &str, data: Vec<u8>, failures: usize) -> Self {
        Self {
            inner: BufferAccessor::new(path, data),
            failures: AtomicUsize::new(failures),
            reads: AtomicUsize::new(0),
            exists_checks: AtomicUsize::new(0),
        }
    }

    fn take_failure(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl FileAccessor for FlakyAccessor {
    fn exists(&self) -> bool {
        self.exists_checks.fetch_add(1, Ordering::SeqCst);
        !self.take_failure()
    }

    fn is_directory(&self) -> bool {
        false
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.take_failure() {
            // Deliver half, as a dropped connection would.
            let half = buf.len() / 2;
            return self.inner.read_at(offset, &mut buf[..half]);
        }
        self.inner.read_at(offset, buf)
    }

    fn path(&self) -> &GamePath {
        self.inner.path()
    }

    fn latest_error(&self) -> String {
        "connection reset".to_string()
    }

    fn layer_name(&self) -> &'static str {
        "flaky"
    }
}

/// Wraps a shared [`FlakyAccessor`] so a test can keep inspecting its counters.
pub struct Shared(pub Arc<FlakyAccessor>);

impl FileAccessor for Shared {
    fn exists(&self) -> bool {
        self.0.exists()
    }

    fn is_directory(&self) -> bool {
        self.0.is_directory()
    }

    fn size(&self) -> u64 {
        self.0.size()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize {
        self.0.read_at(offset, buf)
    }

    fn path(&self) -> &GamePath {
        self.0.path()
    }

    fn latest_error(&self) -> String {
        self.0.latest_error()
    }

    fn layer_name(&self) -> &'static str {
        self.0.layer_name()
    }
}

pub fn pattern_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 253) as u8).collect()
}
