// File type identification: decides what a path holds from path hints and magic bytes.

use strum::IntoStaticStr;
use tracing::{debug, error};

use super::pbp::{PbpReader, PbpSubFile, ELF_MAGIC, PBP_MAGIC, PSAR_OFFSET_FIELD};
use super::sfo::ParamSfo;
use crate::config::{MODE2_SYNC, RAW_SECTOR_SIZE};
use crate::path::EBOOT_NAME;
use crate::source::traits::{read_array, read_u32_le, FileAccessor};

const ZIP_MAGICS: [[u8; 4]; 3] = [*b"PK\x03\x04", *b"PK\x05\x06", *b"PK\x07\x08"];
const RAR_MAGIC: [u8; 4] = *b"Rar!";
const GE_DUMP_TAG: &[u8; 8] = b"PPSSPPGE";

/// First four bytes of DATA.PSAR for an NP (PSN) disc image.
const PSAR_NPUMDIMG: [u8; 4] = *b"NPUM";
/// First four bytes of DATA.PSAR for a PS1 image ("PSISOIMG0000").
const PSAR_PSISOIMG: [u8; 4] = *b"PSIS";

/// Extensions accepted for a bare ELF, besides anything named `BOOT.BIN`.
const ELF_EXTENSIONS: [&str; 4] = [".plf", ".elf", ".prx", ".pbp"];

/// What a path turned out to be. Exactly one per identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[repr(i32)]
pub enum IdentifiedFileType {
    ErrorIdentifying = 0,
    /// A game directory holding `EBOOT.PBP`, or an `EBOOT.PBP` inside `PSP/GAME/`.
    PbpDirectory = 1,
    Pbp = 2,
    Elf = 3,
    Iso = 4,
    /// Disc image shipped inside a PBP (PSN titles).
    IsoNp = 5,
    /// Unpacked disc tree with a `PSP_GAME` directory.
    DiscDirectory = 6,
    UnknownBin = 7,
    UnknownElf = 8,
    ArchiveRar = 9,
    ArchiveZip = 10,
    Archive7z = 11,
    Ps1Pbp = 12,
    /// Raw 2352-byte sector image, i.e. a PSX disc.
    IsoMode2 = 13,
    NormalDirectory = 14,
    SavedataDirectory = 15,
    Savestate = 16,
    GeDump = 17,
    Unknown = 18,
}

impl IdentifiedFileType {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Types that mount as a disc.
    pub fn is_disc(self) -> bool {
        matches!(self, Self::Iso | Self::IsoNp | Self::DiscDirectory)
    }
}

/// Result of [`identify_file`]: the type plus any message the identifier produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    pub file_type: IdentifiedFileType,
    pub message: String,
}

impl Identification {
    fn new(file_type: IdentifiedFileType) -> Self {
        Self {
            file_type,
            message: String::new(),
        }
    }

    fn with_message(file_type: IdentifiedFileType, message: impl Into<String>) -> Self {
        Self {
            file_type,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self::with_message(IdentifiedFileType::ErrorIdentifying, message)
    }
}

/// First bytes of a regular file, read once and shared by the magic rules.
struct Header {
    magic: Option<[u8; 4]>,
    /// First four bytes of DATA.PSAR. Only read behind a PBP magic match,
    /// and even then only a hint.
    psar_id: Option<[u8; 4]>,
}

impl Header {
    fn read(accessor: &dyn FileAccessor) -> Self {
        let magic = read_array::<4>(accessor, 0);
        let psar_id = match magic {
            Some(PBP_MAGIC) => read_u32_le(accessor, PSAR_OFFSET_FIELD)
                .and_then(|offset| read_array::<4>(accessor, offset as u64)),
            _ => None,
        };
        Self { magic, psar_id }
    }
}

/// Classify the content behind `accessor`.
///
/// Never fails: problems are reported as [`IdentifiedFileType::ErrorIdentifying`]
/// with a message. Only reads; calling it twice gives the same answer.
pub fn identify_file(accessor: Option<&dyn FileAccessor>) -> Identification {
    let Some(accessor) = accessor else {
        return Identification::error("Invalid fileLoader");
    };
    let path = accessor.path();
    if path.is_empty() {
        return Identification::error(format!("Invalid filename {}", path));
    }
    if !accessor.exists() {
        return Identification::error(format!("IdentifyFile: File doesn't exist {}", path));
    }

    let extension = path.extension();

    if let Some(found) = identify_by_extension(accessor, &extension) {
        return found;
    }

    if accessor.is_directory() {
        return identify_directory(accessor);
    }

    let header = Header::read(accessor);
    if let Some(magic) = header.magic {
        if let Some(found) = identify_by_magic(accessor, &extension, magic, header.psar_id) {
            return found;
        }
    }

    if let Some(found) = identify_by_extension_fallback(&extension) {
        return found;
    }

    if header.magic.is_none() {
        return Identification::error("Failed to read identification bytes");
    }
    Identification::new(IdentifiedFileType::Unknown)
}

/// Extensions that decide the type before anything else is looked at.
fn identify_by_extension(accessor: &dyn FileAccessor, extension: &str) -> Option<Identification> {
    match extension {
        ".iso" => {
            // PSX images use 2352-byte raw sectors. A matching size alone proves nothing.
            if accessor.size() % RAW_SECTOR_SIZE == 0
                && read_array::<12>(accessor, 0) == Some(MODE2_SYNC)
            {
                return Some(Identification::with_message(
                    IdentifiedFileType::IsoMode2,
                    "ISO in Mode 2: Not a PSP game",
                ));
            }
            Some(Identification::new(IdentifiedFileType::Iso))
        }
        ".cso" => Some(Identification::new(IdentifiedFileType::Iso)),
        ".ppst" => Some(Identification::new(IdentifiedFileType::Savestate)),
        ".ppdmp" => match read_array::<8>(accessor, 0) {
            Some(tag) if &tag == GE_DUMP_TAG => {
                Some(Identification::new(IdentifiedFileType::GeDump))
            }
            _ => None,
        },
        _ => None,
    }
}

fn identify_directory(accessor: &dyn FileAccessor) -> Identification {
    // Very short paths are drive roots and the like; don't probe them.
    if accessor.path().len() > 4 {
        if accessor.has_child(EBOOT_NAME) {
            return Identification::new(IdentifiedFileType::PbpDirectory);
        }
        if accessor.has_child_dir("PSP_GAME") {
            return Identification::new(IdentifiedFileType::DiscDirectory);
        }
        if accessor.has_child("PARAM.SFO") {
            return Identification::new(IdentifiedFileType::SavedataDirectory);
        }
    }
    Identification::new(IdentifiedFileType::NormalDirectory)
}

fn identify_by_magic(
    accessor: &dyn FileAccessor,
    extension: &str,
    magic: [u8; 4],
    psar_id: Option<[u8; 4]>,
) -> Option<Identification> {
    if ZIP_MAGICS.contains(&magic) {
        return Some(Identification::new(IdentifiedFileType::ArchiveZip));
    }
    if magic == RAR_MAGIC {
        return Some(Identification::new(IdentifiedFileType::ArchiveRar));
    }

    if magic == ELF_MAGIC {
        // Some ELFs ship misnamed as .pbp; accept those too.
        let accepted = ELF_EXTENSIONS.contains(&extension)
            || accessor.path().file_name().contains("BOOT.BIN");
        let file_type = if accepted {
            IdentifiedFileType::Elf
        } else {
            IdentifiedFileType::UnknownElf
        };
        return Some(Identification::new(file_type));
    }

    if magic == PBP_MAGIC {
        return Some(identify_pbp(accessor, psar_id));
    }
    None
}

fn identify_pbp(accessor: &dyn FileAccessor, psar_id: Option<[u8; 4]>) -> Identification {
    // PS1 titles come first: some are malformed enough to slip past the PSAR check.
    if is_ps1_category(accessor) {
        return Identification::new(IdentifiedFileType::Ps1Pbp);
    }

    match psar_id {
        Some(PSAR_NPUMDIMG) => return Identification::new(IdentifiedFileType::IsoNp),
        Some(PSAR_PSISOIMG) => return Identification::new(IdentifiedFileType::Ps1Pbp),
        _ => {}
    }

    // An EBOOT.PBP inside a memory stick game folder stands for the folder.
    if accessor.path().contains("PSP/GAME/") {
        return Identification::new(IdentifiedFileType::PbpDirectory);
    }
    Identification::new(IdentifiedFileType::Pbp)
}

/// PS1 EBOOTs carry `CATEGORY = "ME"` in their PARAM.SFO.
fn is_ps1_category(accessor: &dyn FileAccessor) -> bool {
    let pbp = PbpReader::new(accessor);
    if !pbp.is_valid() || pbp.is_elf() {
        return false;
    }
    let Some(sfo_data) = pbp.sub_file(PbpSubFile::ParamSfo) else {
        return false;
    };
    match ParamSfo::parse(&sfo_data) {
        Ok(sfo) => sfo.get_string("CATEGORY") == Some("ME"),
        Err(e) => {
            debug!("unreadable PARAM.SFO in {}: {}", accessor.path(), e);
            false
        }
    }
}

/// Extension-only guesses for files no magic rule claimed.
fn identify_by_extension_fallback(extension: &str) -> Option<Identification> {
    let file_type = match extension {
        ".pbp" => {
            error!("A PBP with the wrong magic number?");
            IdentifiedFileType::Pbp
        }
        ".bin" => IdentifiedFileType::UnknownBin,
        ".zip" => IdentifiedFileType::ArchiveZip,
        ".rar" | ".r00" | ".r01" => IdentifiedFileType::ArchiveRar,
        ".7z" => IdentifiedFileType::Archive7z,
        _ => return None,
    };
    Some(Identification::new(file_type))
}
