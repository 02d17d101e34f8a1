// Disc hot-swap: replaces the mounted disc of a running session.

use tracing::{info, warn};

use super::host::Host;
use super::session::Session;
use crate::config::DISC_MOUNT;
use crate::detect::identify::identify_file;
use crate::error::ReplaceError;
use crate::path::GamePath;

impl<H: Host> Session<H> {
    /// Swap the mounted disc for the one at `path`.
    ///
    /// Either the new disc ends up bound and the old accessor is released, or
    /// nothing changes and the old disc stays in use. The coarse core state is
    /// never touched: a failed swap must leave the running game usable.
    pub fn replace_media(&mut self, path: &GamePath) -> Result<(), ReplaceError> {
        if !self.host.has_mounted_system(DISC_MOUNT) {
            return Err(ReplaceError::NoDisc);
        }

        let candidate = self.pipeline.construct(path);
        if !candidate.exists() {
            return Err(ReplaceError::Missing(candidate.path().to_string()));
        }

        let candidate = self.pipeline.resolve_target(candidate);
        let identified = identify_file(Some(candidate.as_ref()));
        if !identified.file_type.is_disc() {
            return Err(ReplaceError::Unsupported {
                code: identified.file_type.code(),
                message: identified.message,
            });
        }

        if let Err(e) = self.host.reinit_memory_for_game_iso(candidate.as_ref()) {
            warn!("reinit memory for {} failed: {:#}", candidate.path(), e);
            return Err(ReplaceError::ReinitFailed);
        }

        info!("disc replaced with {}", candidate.path());
        self.loaded_file = Some(candidate);
        Ok(())
    }
}
