use anyhow::Result;

use crate::source::traits::FileAccessor;

/// The emulator side of a boot: virtual filesystem, guest memory and the
/// format-specific loading routines.
///
/// Loading routines receive the accessor by reference; the session keeps
/// ownership and binds it once the load succeeds.
pub trait Host {
    /// Working directory the guest starts in.
    fn set_starting_directory(&mut self, path: &str);

    /// Whether a filesystem is mounted at `prefix` (e.g. `disc0:`).
    fn has_mounted_system(&self, prefix: &str) -> bool;

    /// Size guest memory for a disc-backed game.
    fn init_memory_for_game_iso(&mut self, disc: &dyn FileAccessor) -> Result<()>;

    /// Redo the disc-backed memory setup in place for a swapped disc.
    fn reinit_memory_for_game_iso(&mut self, disc: &dyn FileAccessor) -> Result<()>;

    /// Boot a bare ELF or a PBP.
    fn load_elf_pbp(&mut self, file: &dyn FileAccessor) -> Result<()>;

    /// Boot from a disc image or disc tree.
    fn load_disc(&mut self, disc: &dyn FileAccessor) -> Result<()>;

    /// Replay a captured GE command stream.
    fn load_ge_dump(&mut self, dump: &dyn FileAccessor) -> Result<()>;
}
