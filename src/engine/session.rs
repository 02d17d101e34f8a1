// Boot session: the host, the accessor pipeline and the currently bound game file.

use tracing::debug;

use super::host::Host;
use crate::error::LoadError;
use crate::path::GamePath;
use crate::pipeline::PipelineBuilder;
use crate::source::traits::FileAccessor;

/// Coarse execution state the rest of the host polls to halt startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreState {
    Uninitialized,
    Booting,
    BootError,
}

pub struct Session<H: Host> {
    pub(super) host: H,
    pub(super) pipeline: PipelineBuilder,
    pub(super) core_state: CoreState,
    /// The booted file. For disc games this is the disc the filesystem reads.
    pub(super) loaded_file: Option<Box<dyn FileAccessor>>,
}

impl<H: Host> Session<H> {
    pub fn new(host: H, pipeline: PipelineBuilder) -> Self {
        Self {
            host,
            pipeline,
            core_state: CoreState::Uninitialized,
            loaded_file: None,
        }
    }

    /// Build the accessor for `path` and boot it.
    pub fn boot(&mut self, path: &GamePath) -> Result<(), LoadError> {
        self.core_state = CoreState::Booting;
        let accessor = self.pipeline.construct(path);
        self.load_file(accessor)
    }

    /// Forget the previous boot: state back to uninitialized, binding released.
    pub fn reset(&mut self) {
        debug!("session reset");
        self.core_state = CoreState::Uninitialized;
        self.loaded_file = None;
    }

    pub fn core_state(&self) -> CoreState {
        self.core_state
    }

    pub fn loaded_file(&self) -> Option<&dyn FileAccessor> {
        self.loaded_file.as_deref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn pipeline(&self) -> &PipelineBuilder {
        &self.pipeline
    }

    pub(super) fn fail(&mut self, error: LoadError) -> Result<(), LoadError> {
        self.core_state = CoreState::BootError;
        Err(error)
    }
}
