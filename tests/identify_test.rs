mod common;

use psp_loader::config::{MODE2_SYNC, RAW_SECTOR_SIZE};
use psp_loader::source::{BufferAccessor, LocalAccessor};
use psp_loader::{identify_file, FileAccessor, GamePath, IdentifiedFileType};

use common::{elf_bytes, make_dir, pbp_bytes, write_file};

fn identify_buffer(path: &str, data: &[u8]) -> IdentifiedFileType {
    let accessor = BufferAccessor::new(path, data.to_vec());
    identify_file(Some(&accessor)).file_type
}

fn identify_local(path: &GamePath) -> IdentifiedFileType {
    let accessor = LocalAccessor::new(path.clone());
    identify_file(Some(&accessor)).file_type
}

fn mode2_image(sectors: u64) -> Vec<u8> {
    let mut data = vec![0u8; (RAW_SECTOR_SIZE * sectors) as usize];
    data[..12].copy_from_slice(&MODE2_SYNC);
    data
}

#[test]
fn test_missing_accessor_and_path() {
    let none = identify_file(None);
    assert_eq!(none.file_type, IdentifiedFileType::ErrorIdentifying);
    assert!(!none.message.is_empty());

    let unnamed = BufferAccessor::new("", vec![0u8; 16]);
    let result = identify_file(Some(&unnamed));
    assert_eq!(result.file_type, IdentifiedFileType::ErrorIdentifying);
    assert!(result.message.starts_with("Invalid filename"));
}

#[test]
fn test_nonexistent_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = GamePath::new(dir.path().join("missing.iso").to_string_lossy().into_owned());
    let accessor = LocalAccessor::new(path.clone());

    let result = identify_file(Some(&accessor));
    assert_eq!(result.file_type, IdentifiedFileType::ErrorIdentifying);
    assert!(result.message.contains("doesn't exist"));
    assert!(result.message.contains(path.as_str()));
}

#[test]
fn test_iso_mode2_detection() {
    for sectors in 1..=3 {
        assert_eq!(
            identify_buffer("/games/psx.iso", &mode2_image(sectors)),
            IdentifiedFileType::IsoMode2
        );
    }

    // Same size, different leading bytes.
    let plain = vec![0u8; (RAW_SECTOR_SIZE * 2) as usize];
    assert_eq!(identify_buffer("/games/game.iso", &plain), IdentifiedFileType::Iso);

    // Sync pattern without the raw sector size.
    let mut odd = mode2_image(2);
    odd.push(0);
    assert_eq!(identify_buffer("/games/game.iso", &odd), IdentifiedFileType::Iso);

    let result = identify_file(Some(&BufferAccessor::new("/games/psx.ISO", mode2_image(1))));
    assert_eq!(result.file_type, IdentifiedFileType::IsoMode2);
    assert!(result.message.contains("Mode 2"));
}

#[test]
fn test_extension_rules() {
    assert_eq!(identify_buffer("/games/game.cso", b"CISO"), IdentifiedFileType::Iso);
    assert_eq!(identify_buffer("/states/slot1.ppst", b"PPST"), IdentifiedFileType::Savestate);
    assert_eq!(identify_buffer("/dumps/frame.ppdmp", b"PPSSPPGE\x05\0\0\0"), IdentifiedFileType::GeDump);

    // A .ppdmp without the tag falls through to the generic rules.
    assert_eq!(identify_buffer("/dumps/frame.ppdmp", b"NOTADUMP"), IdentifiedFileType::Unknown);
    assert_eq!(identify_buffer("/dumps/frame.ppdmp", b"PK\x03\x04...."), IdentifiedFileType::ArchiveZip);
}

#[test]
fn test_directories() {
    let root = tempfile::tempdir().unwrap();

    let pbp_dir = make_dir(root.path(), "homebrew");
    write_file(root.path(), "homebrew/EBOOT.PBP", &pbp_bytes("UG", b"\0\0\0\0"));
    assert_eq!(identify_local(&pbp_dir), IdentifiedFileType::PbpDirectory);

    // EBOOT.PBP wins over PSP_GAME.
    make_dir(root.path(), "homebrew/PSP_GAME");
    assert_eq!(identify_local(&pbp_dir), IdentifiedFileType::PbpDirectory);

    let disc_dir = make_dir(root.path(), "unpacked/PSP_GAME").navigate_up();
    assert_eq!(identify_local(&disc_dir), IdentifiedFileType::DiscDirectory);

    let save_dir = make_dir(root.path(), "SAVEDATA/ULUS00000");
    write_file(root.path(), "SAVEDATA/ULUS00000/PARAM.SFO", b"\0PSF");
    assert_eq!(identify_local(&save_dir), IdentifiedFileType::SavedataDirectory);

    let plain = make_dir(root.path(), "empty");
    assert_eq!(identify_local(&plain), IdentifiedFileType::NormalDirectory);
}

#[test]
fn test_archive_magic() {
    for magic in [b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"] {
        assert_eq!(identify_buffer("/games/pack.dat", magic), IdentifiedFileType::ArchiveZip);
    }
    assert_eq!(identify_buffer("/games/pack.iso.part", b"Rar!\x1a\x07"), IdentifiedFileType::ArchiveRar);
}

#[test]
fn test_elf_rules() {
    let elf = elf_bytes();
    assert_eq!(identify_buffer("/games/hello.elf", &elf), IdentifiedFileType::Elf);
    assert_eq!(identify_buffer("/games/hello.prx", &elf), IdentifiedFileType::Elf);
    assert_eq!(identify_buffer("/games/misnamed.pbp", &elf), IdentifiedFileType::Elf);
    assert_eq!(identify_buffer("/disc/PSP_GAME/SYSDIR/BOOT.BIN", &elf), IdentifiedFileType::Elf);
    assert_eq!(identify_buffer("/games/hello.dat", &elf), IdentifiedFileType::UnknownElf);
}

#[test]
fn test_pbp_rules() {
    assert_eq!(
        identify_buffer("/games/ps1.pbp", &pbp_bytes("ME", b"PSISOIMG0000")),
        IdentifiedFileType::Ps1Pbp
    );
    // Category check comes first, even without a PS1 PSAR.
    assert_eq!(
        identify_buffer("/games/ps1.pbp", &pbp_bytes("ME", b"\0\0\0\0")),
        IdentifiedFileType::Ps1Pbp
    );
    assert_eq!(
        identify_buffer("/games/ps1.pbp", &pbp_bytes("UG", b"PSISOIMG0000")),
        IdentifiedFileType::Ps1Pbp
    );
    assert_eq!(
        identify_buffer("/games/psn.pbp", &pbp_bytes("UG", b"NPUMDIMG")),
        IdentifiedFileType::IsoNp
    );
    assert_eq!(
        identify_buffer("/games/homebrew.pbp", &pbp_bytes("MG", b"\0\0\0\0")),
        IdentifiedFileType::Pbp
    );
    assert_eq!(
        identify_buffer("/ms/PSP/GAME/HB/EBOOT.PBP", &pbp_bytes("MG", b"\0\0\0\0")),
        IdentifiedFileType::PbpDirectory
    );
}

#[test]
fn test_pbp_with_garbage_psar_offset() {
    let mut data = pbp_bytes("UG", b"");
    // DATA.PSAR offset far past the end of the file.
    data[0x24..0x28].copy_from_slice(&0x7FFF_FFFFu32.to_le_bytes());
    assert_eq!(identify_buffer("/games/broken.pbp", &data), IdentifiedFileType::Pbp);
}

#[test]
fn test_extension_fallbacks() {
    assert_eq!(identify_buffer("/games/bad.pbp", b"XXXXXXXX"), IdentifiedFileType::Pbp);
    assert_eq!(identify_buffer("/games/data.bin", b"XXXXXXXX"), IdentifiedFileType::UnknownBin);
    assert_eq!(identify_buffer("/games/pack.zip", b"XXXXXXXX"), IdentifiedFileType::ArchiveZip);
    assert_eq!(identify_buffer("/games/pack.rar", b"XXXXXXXX"), IdentifiedFileType::ArchiveRar);
    assert_eq!(identify_buffer("/games/pack.r00", b"XXXXXXXX"), IdentifiedFileType::ArchiveRar);
    assert_eq!(identify_buffer("/games/pack.r01", b"XXXXXXXX"), IdentifiedFileType::ArchiveRar);
    assert_eq!(identify_buffer("/games/pack.7z", b"7z\xBC\xAF"), IdentifiedFileType::Archive7z);
    assert_eq!(identify_buffer("/games/notes.txt", b"hello world"), IdentifiedFileType::Unknown);
}

#[test]
fn test_short_reads() {
    // Zero bytes with a known extension still gets its fallback.
    assert_eq!(identify_buffer("/games/empty.bin", b""), IdentifiedFileType::UnknownBin);
    assert_eq!(identify_buffer("/games/tiny.7z", b"7z"), IdentifiedFileType::Archive7z);

    let result = identify_file(Some(&BufferAccessor::new("/games/empty.dat", Vec::new())));
    assert_eq!(result.file_type, IdentifiedFileType::ErrorIdentifying);
    assert_eq!(result.message, "Failed to read identification bytes");
}

#[test]
fn test_zero_byte_bin_on_disk() {
    let root = tempfile::tempdir().unwrap();
    let path = write_file(root.path(), "empty.bin", b"");
    assert_eq!(identify_local(&path), IdentifiedFileType::UnknownBin);
}

#[test]
fn test_identify_is_idempotent() {
    let root = tempfile::tempdir().unwrap();
    let samples = [
        write_file(root.path(), "a.iso", &mode2_image(2)),
        write_file(root.path(), "b.pbp", &pbp_bytes("ME", b"")),
        write_file(root.path(), "c.elf", &elf_bytes()),
        write_file(root.path(), "d.zip", b"PK\x03\x04rest"),
        make_dir(root.path(), "e"),
    ];

    for path in &samples {
        let accessor = LocalAccessor::new(path.clone());
        let first = identify_file(Some(&accessor));
        let second = identify_file(Some(&accessor));
        assert_eq!(first, second, "{}", path);
        assert!(accessor.exists());
    }
}

#[test]
fn test_type_codes_and_names() {
    assert_eq!(IdentifiedFileType::ErrorIdentifying.code(), 0);
    assert_eq!(IdentifiedFileType::Elf.code(), 3);
    assert_eq!(IdentifiedFileType::IsoNp.name(), "iso_np");
    assert!(IdentifiedFileType::DiscDirectory.is_disc());
    assert!(!IdentifiedFileType::Pbp.is_disc());
}
