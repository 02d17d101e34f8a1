// Boot dispatch: routes an identified file to a loading routine or a terminal error.

use tracing::{error, info};

use super::host::Host;
use super::session::Session;
use crate::config::{DISC_USER_DIR, MEMSTICK_ROOT};
use crate::detect::identify::{identify_file, IdentifiedFileType};
use crate::error::LoadError;
use crate::source::traits::FileAccessor;

/// What the dispatcher does with an identified type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    /// Swap the directory for its EBOOT.PBP, re-identify, then boot.
    PbpDirectory,
    ElfPbp,
    Disc,
    GeDump,
    Ps1Eboot,
    RarArchive,
    ZipArchive,
    SevenZipArchive,
    PsxImage,
    JustDirectory,
    SaveState,
    SaveData,
    UnknownType,
    IdentifyError,
}

const ROUTES: &[(IdentifiedFileType, Route)] = &[
    (IdentifiedFileType::PbpDirectory, Route::PbpDirectory),
    (IdentifiedFileType::Pbp, Route::ElfPbp),
    (IdentifiedFileType::Elf, Route::ElfPbp),
    (IdentifiedFileType::Iso, Route::Disc),
    (IdentifiedFileType::IsoNp, Route::Disc),
    // Mounting already happened by the time we get here.
    (IdentifiedFileType::DiscDirectory, Route::Disc),
    (IdentifiedFileType::Ps1Pbp, Route::Ps1Eboot),
    (IdentifiedFileType::ArchiveRar, Route::RarArchive),
    (IdentifiedFileType::ArchiveZip, Route::ZipArchive),
    (IdentifiedFileType::Archive7z, Route::SevenZipArchive),
    (IdentifiedFileType::IsoMode2, Route::PsxImage),
    (IdentifiedFileType::NormalDirectory, Route::JustDirectory),
    // Savestates and save data could be loaded directly one day.
    (IdentifiedFileType::Savestate, Route::SaveState),
    (IdentifiedFileType::SavedataDirectory, Route::SaveData),
    (IdentifiedFileType::GeDump, Route::GeDump),
    (IdentifiedFileType::UnknownBin, Route::UnknownType),
    (IdentifiedFileType::UnknownElf, Route::UnknownType),
    (IdentifiedFileType::Unknown, Route::UnknownType),
    (IdentifiedFileType::ErrorIdentifying, Route::IdentifyError),
];

fn route_for(file_type: IdentifiedFileType) -> Option<Route> {
    ROUTES
        .iter()
        .find(|(t, _)| *t == file_type)
        .map(|(_, route)| *route)
}

/// Identifier message plus the accessor's own I/O error, or a generic fallback.
fn identification_error(message: &str, accessor: &dyn FileAccessor) -> LoadError {
    let latest = accessor.latest_error();
    let parts: Vec<&str> = [message, latest.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    let text = if parts.is_empty() {
        "Error reading file".to_string()
    } else {
        parts.join(": ")
    };
    error!("Error while identifying file: {}", text);
    LoadError::Identification(text)
}

impl<H: Host> Session<H> {
    /// Identify `accessor` and hand it to the matching loading routine.
    ///
    /// Terminal classifications put the session into [`CoreState::BootError`].
    /// A failing loading routine is reported as [`LoadError::Routine`] and
    /// leaves the state to the routine. On success the accessor (or the
    /// EBOOT.PBP it resolved to) becomes the session's loaded file.
    ///
    /// [`CoreState::BootError`]: super::session::CoreState::BootError
    pub fn load_file(&mut self, accessor: Box<dyn FileAccessor>) -> Result<(), LoadError> {
        let identified = identify_file(Some(accessor.as_ref()));
        let Some(route) = route_for(identified.file_type) else {
            let err = LoadError::Unhandled(identified.file_type.code());
            error!("{}", err);
            return self.fail(err);
        };

        match route {
            Route::PbpDirectory => self.load_pbp_directory(accessor),
            Route::ElfPbp => {
                info!("File is an ELF or loose PBP!");
                self.run_routine(accessor, H::load_elf_pbp)
            }
            Route::Disc => {
                self.host.set_starting_directory(DISC_USER_DIR);
                self.run_routine(accessor, H::load_disc)
            }
            Route::GeDump => self.run_routine(accessor, H::load_ge_dump),
            Route::Ps1Eboot => self.fail(LoadError::Ps1Eboot),
            Route::RarArchive => self.fail(LoadError::RarArchive),
            Route::ZipArchive => self.fail(LoadError::ZipArchive),
            Route::SevenZipArchive => self.fail(LoadError::SevenZipArchive),
            Route::PsxImage => self.fail(LoadError::PsxImage),
            Route::JustDirectory => {
                error!("Just a directory.");
                self.fail(LoadError::JustDirectory)
            }
            Route::SaveState => self.fail(LoadError::SaveState),
            Route::SaveData => self.fail(LoadError::SaveData),
            Route::UnknownType => {
                error!(
                    "Unknown file type: {} ({})",
                    accessor.path(),
                    identified.message
                );
                self.fail(LoadError::UnknownType(accessor.path().to_string()))
            }
            Route::IdentifyError => {
                let err = identification_error(&identified.message, accessor.as_ref());
                self.fail(err)
            }
        }
    }

    fn load_pbp_directory(&mut self, accessor: Box<dyn FileAccessor>) -> Result<(), LoadError> {
        let accessor = self.pipeline.resolve_target(accessor);
        if !accessor.exists() {
            return self.fail(LoadError::MissingEboot);
        }
        info!("File is a PBP in a directory!");

        let eboot = identify_file(Some(accessor.as_ref()));
        match eboot.file_type {
            IdentifiedFileType::IsoNp => {
                if let Err(e) = self.host.init_memory_for_game_iso(accessor.as_ref()) {
                    return Err(LoadError::Routine(e.to_string()));
                }
                self.host.set_starting_directory(DISC_USER_DIR);
                self.run_routine(accessor, H::load_disc)
            }
            IdentifiedFileType::Ps1Pbp => self.fail(LoadError::Ps1Eboot),
            IdentifiedFileType::ErrorIdentifying => {
                let err = identification_error(&eboot.message, accessor.as_ref());
                self.fail(err)
            }
            _ => {
                let dir = accessor.path().directory().replace('\\', "/");
                if let Some(pos) = dir.find("PSP/GAME/") {
                    self.host
                        .set_starting_directory(&format!("{}{}", MEMSTICK_ROOT, &dir[pos..]));
                }
                self.run_routine(accessor, H::load_elf_pbp)
            }
        }
    }

    fn run_routine<F>(&mut self, accessor: Box<dyn FileAccessor>, routine: F) -> Result<(), LoadError>
    where
        F: FnOnce(&mut H, &dyn FileAccessor) -> anyhow::Result<()>,
    {
        match routine(&mut self.host, accessor.as_ref()) {
            Ok(()) => {
                self.loaded_file = Some(accessor);
                Ok(())
            }
            Err(e) => {
                error!("loading {} failed: {:#}", accessor.path(), e);
                Err(LoadError::Routine(e.to_string()))
            }
        }
    }
}
