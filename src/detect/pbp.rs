// PBP container: header of the packaged-executable format and access to its sub-files.

use tracing::debug;

use crate::source::traits::{read_array, FileAccessor};

pub const PBP_MAGIC: [u8; 4] = *b"\0PBP";
pub const ELF_MAGIC: [u8; 4] = *b"\x7FELF";

/// Offset of the DATA.PSAR offset field in the header.
pub const PSAR_OFFSET_FIELD: u64 = 0x24;

const HEADER_LEN: usize = 0x28;

/// Sub-files in the order their offsets appear in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PbpSubFile {
    ParamSfo = 0,
    Icon0 = 1,
    Icon1 = 2,
    Pic0 = 3,
    Pic1 = 4,
    Snd0 = 5,
    DataPsp = 6,
    DataPsar = 7,
}

/// Reader over a PBP container held by an accessor.
///
/// A plain ELF handed to the reader is accepted and reported through
/// [`PbpReader::is_elf`]; it has no sub-files.
pub struct PbpReader<'a> {
    accessor: &'a dyn FileAccessor,
    file_size: u64,
    offsets: [u32; 8],
    valid: bool,
    is_elf: bool,
}

impl<'a> PbpReader<'a> {
    pub fn new(accessor: &'a dyn FileAccessor) -> Self {
        let mut reader = Self {
            accessor,
            file_size: accessor.size(),
            offsets: [0; 8],
            valid: false,
            is_elf: false,
        };

        let Some(header) = read_array::<HEADER_LEN>(accessor, 0) else {
            // An ELF shorter than a PBP header is still an ELF.
            if read_array::<4>(accessor, 0) == Some(ELF_MAGIC) {
                reader.valid = true;
                reader.is_elf = true;
            } else {
                debug!("PBP header truncated: {}", accessor.path());
            }
            return reader;
        };

        let magic: Result<[u8; 4], _> = header[0..4].try_into();
        match magic {
            Ok(PBP_MAGIC) => {
                for (i, slot) in reader.offsets.iter_mut().enumerate() {
                    let pos = 8 + i * 4;
                    *slot = u32::from_le_bytes([
                        header[pos],
                        header[pos + 1],
                        header[pos + 2],
                        header[pos + 3],
                    ]);
                }
                reader.valid = true;
            }
            Ok(ELF_MAGIC) => {
                reader.valid = true;
                reader.is_elf = true;
            }
            _ => debug!("not a PBP: {}", accessor.path()),
        }
        reader
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_elf(&self) -> bool {
        self.is_elf
    }

    /// `(offset, size)` of a sub-file, or `None` if the header entry is unusable.
    pub fn sub_file_range(&self, file: PbpSubFile) -> Option<(u64, u64)> {
        if !self.valid || self.is_elf {
            return None;
        }
        let index = file as usize;
        let start = self.offsets[index] as u64;
        let end = match self.offsets.get(index + 1) {
            Some(&next) => next as u64,
            None => self.file_size,
        };
        if start > end || end > self.file_size {
            return None;
        }
        Some((start, end - start))
    }

    pub fn sub_file(&self, file: PbpSubFile) -> Option<Vec<u8>> {
        let (offset, size) = self.sub_file_range(file)?;
        let mut data = vec![0u8; usize::try_from(size).ok()?];
        if self.accessor.read_at(offset, &mut data) != data.len() {
            return None;
        }
        Some(data)
    }
}

/// Assemble a PBP from its sub-files, in header order.
pub fn build_pbp(sub_files: &[&[u8]; 8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN);
    out.extend_from_slice(&PBP_MAGIC);
    out.extend_from_slice(&0x0001_0000u32.to_le_bytes());

    let mut offset = HEADER_LEN as u32;
    for data in sub_files {
        out.extend_from_slice(&offset.to_le_bytes());
        offset += data.len() as u32;
    }
    for data in sub_files {
        out.extend_from_slice(data);
    }
    out
}
