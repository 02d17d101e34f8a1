use thiserror::Error;

/// Tool a user needs to unpack an archive before it can be booted.
#[cfg(windows)]
const RAR_TOOL: &str = "WINRAR";
#[cfg(not(windows))]
const RAR_TOOL: &str = "UnRAR";

/// Terminal outcome of booting a file.
///
/// The `Display` text of each variant is the message shown to the user, so
/// every variant names the concrete reason rather than a generic failure.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A `PSP/GAME` directory or loose EBOOT path without an `EBOOT.PBP` behind it.
    #[error("No EBOOT.PBP, misidentified game")]
    MissingEboot,

    /// PS1 titles packaged as EBOOT.PBP.
    #[error("PS1 EBOOTs are not supported.")]
    Ps1Eboot,

    #[error("RAR file detected (Require {RAR_TOOL})")]
    RarArchive,

    #[error("ZIP file detected (Require {RAR_TOOL})")]
    ZipArchive,

    #[error("7z file detected (Require 7-Zip)")]
    SevenZipArchive,

    /// A raw mode 2 image, i.e. a PSX disc.
    #[error("PSX game image detected.")]
    PsxImage,

    #[error("Just a directory.")]
    JustDirectory,

    #[error("This is a saved state, not a game.")]
    SaveState,

    #[error("This is save data, not a game.")]
    SaveData,

    #[error("Unknown file type: {0}")]
    UnknownType(String),

    /// Identification failed; carries the combined identifier and I/O error text.
    #[error("{0}")]
    Identification(String),

    #[error("Unhandled identified file type {0}")]
    Unhandled(i32),

    /// The downstream loading routine reported a failure.
    #[error("{0}")]
    Routine(String),
}

/// Failure of a disc hot-swap. The running session stays usable after any of these.
#[derive(Error, Debug)]
pub enum ReplaceError {
    #[error("has no disc")]
    NoDisc,

    #[error("{0} doesn't exist")]
    Missing(String),

    #[error("reinit memory failed")]
    ReinitFailed,

    #[error("Unsupported file type: {code} {message}")]
    Unsupported { code: i32, message: String },
}
