// Accessor pipeline construction: picks the base accessor for a path and stacks decorators on it.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::LoaderConfig;
use crate::detect::identify::{identify_file, IdentifiedFileType};
use crate::path::{resolve_pbp_file, GamePath};
use crate::registry::FactoryRegistry;
use crate::source::{
    CachingAccessor, DiskCachingAccessor, FileAccessor, HttpAccessor, LocalAccessor,
    RetryingAccessor,
};

#[derive(Clone)]
pub struct PipelineBuilder {
    registry: Arc<FactoryRegistry>,
    config: LoaderConfig,
}

impl PipelineBuilder {
    pub fn new(registry: Arc<FactoryRegistry>, config: LoaderConfig) -> Self {
        Self { registry, config }
    }

    /// Builder over the process-wide registry.
    pub fn with_global_registry(config: LoaderConfig) -> Self {
        Self::new(FactoryRegistry::global(), config)
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<FactoryRegistry> {
        &self.registry
    }

    /// Build the accessor for `path`. Always returns something; unknown paths
    /// get a plain local accessor that reports non-existence on its own.
    ///
    /// Network paths become `memory-cache(disk-cache(retry(http)))`, with the
    /// disk cache left out in headless runs.
    pub fn construct(&self, path: &GamePath) -> Box<dyn FileAccessor> {
        if path.is_network() {
            let mut accessor: Box<dyn FileAccessor> = Box::new(RetryingAccessor::new(
                Box::new(HttpAccessor::new(path.clone())),
                self.config.max_retries,
                self.config.retry_delay_ms,
            ));
            // Headless runs are usually tests that may mutate the source.
            if !self.config.headless {
                accessor = Box::new(DiskCachingAccessor::new(
                    accessor,
                    self.config.cache_dir(),
                    self.config.disk_cache_chunk_size,
                ));
            }
            debug!("network accessor pipeline for {}", path);
            return Box::new(CachingAccessor::new(
                accessor,
                self.config.memory_cache_block_size,
                self.config.memory_cache_max_blocks,
            ));
        }

        if let Some(factory) = self.registry.resolve(path) {
            debug!("registered factory handles {}", path);
            return factory.construct(path);
        }

        Box::new(LocalAccessor::new(path.clone()))
    }

    /// If `accessor` is a game directory, swap it for an accessor on the
    /// `EBOOT.PBP` inside. Anything else is returned as is.
    pub fn resolve_target(&self, accessor: Box<dyn FileAccessor>) -> Box<dyn FileAccessor> {
        let identified = identify_file(Some(accessor.as_ref()));
        if identified.file_type != IdentifiedFileType::PbpDirectory {
            return accessor;
        }

        let eboot = resolve_pbp_file(accessor.path());
        if &eboot == accessor.path() {
            return accessor;
        }
        info!("switching to {}", eboot);
        self.construct(&eboot)
    }
}
