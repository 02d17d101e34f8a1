// Loader factory registry: path-prefix routing to specialised accessors.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::path::GamePath;
use crate::source::traits::FileAccessor;

/// Builds accessors for paths under a registered prefix, with whatever
/// decoration the owning subsystem needs.
pub trait LoaderFactory: Send + Sync {
    fn construct(&self, path: &GamePath) -> Box<dyn FileAccessor>;
}

static GLOBAL: OnceLock<Arc<FactoryRegistry>> = OnceLock::new();

/// Prefix → factory map. Populated at startup, read on every load.
///
/// When several prefixes match a path the longest one wins.
#[derive(Default)]
pub struct FactoryRegistry {
    factories: RwLock<BTreeMap<String, Arc<dyn LoaderFactory>>>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry shared by subsystems that register at startup.
    pub fn global() -> Arc<FactoryRegistry> {
        GLOBAL.get_or_init(|| Arc::new(FactoryRegistry::new())).clone()
    }

    /// Store `factory` for `prefix`, replacing any previous entry.
    pub fn register(&self, prefix: impl Into<String>, factory: Arc<dyn LoaderFactory>) {
        let prefix = prefix.into();
        debug!("registering file loader factory for prefix {}", prefix);
        self.factories.write().insert(prefix, factory);
    }

    /// Factory for the longest registered prefix of `path`.
    pub fn resolve(&self, path: &GamePath) -> Option<Arc<dyn LoaderFactory>> {
        // In reverse key order a longer prefix sorts before any shorter prefix of it.
        self.factories
            .read()
            .iter()
            .rev()
            .find(|(prefix, _)| path.as_str().starts_with(prefix.as_str()))
            .map(|(_, factory)| factory.clone())
    }

    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }
}

/// Register a factory with the process-wide registry.
pub fn register_file_loader_factory(prefix: impl Into<String>, factory: Arc<dyn LoaderFactory>) {
    FactoryRegistry::global().register(prefix, factory);
}
