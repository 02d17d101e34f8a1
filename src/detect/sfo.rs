// PARAM.SFO: the key/value metadata block embedded in packaged titles.

use std::collections::HashMap;

use thiserror::Error;

const SFO_MAGIC: &[u8; 4] = b"\0PSF";
const HEADER_LEN: usize = 0x14;
const INDEX_ENTRY_LEN: usize = 0x10;

/// Data format codes of an index entry.
const FMT_UTF8_SPECIAL: u16 = 0x0004;
const FMT_UTF8: u16 = 0x0204;
const FMT_INT32: u16 = 0x0404;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SfoError {
    #[error("PARAM.SFO too short: {0} bytes")]
    Truncated(usize),

    #[error("bad PARAM.SFO magic")]
    BadMagic,

    #[error("PARAM.SFO entry {0} points outside the block")]
    EntryOutOfBounds(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SfoValue {
    Text(String),
    Int(u32),
}

/// Parsed PARAM.SFO contents.
#[derive(Debug, Clone, Default)]
pub struct ParamSfo {
    values: HashMap<String, SfoValue>,
}

fn u16_at(data: &[u8], pos: usize) -> Option<u16> {
    data.get(pos..pos + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
}

fn u32_at(data: &[u8], pos: usize) -> Option<u32> {
    data.get(pos..pos + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// NUL-terminated string starting at `pos`, bounded by `limit` bytes.
fn c_str_at(data: &[u8], pos: usize, limit: usize) -> Option<String> {
    let tail = data.get(pos..)?;
    let tail = &tail[..limit.min(tail.len())];
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    Some(String::from_utf8_lossy(&tail[..end]).into_owned())
}

impl ParamSfo {
    pub fn parse(data: &[u8]) -> Result<Self, SfoError> {
        if data.len() < HEADER_LEN {
            return Err(SfoError::Truncated(data.len()));
        }
        if &data[0..4] != SFO_MAGIC {
            return Err(SfoError::BadMagic);
        }

        let header_u32 = |pos| u32_at(data, pos).ok_or(SfoError::Truncated(data.len()));
        let key_table = header_u32(0x08)? as usize;
        let data_table = header_u32(0x0C)? as usize;
        let entries = header_u32(0x10)? as usize;

        let mut values = HashMap::new();
        for i in 0..entries {
            let base = HEADER_LEN + i * INDEX_ENTRY_LEN;
            let out_of_bounds = SfoError::EntryOutOfBounds(i);

            let key_offset = u16_at(data, base).ok_or(out_of_bounds.clone())? as usize;
            let format = u16_at(data, base + 2).ok_or(out_of_bounds.clone())?;
            let len = u32_at(data, base + 4).ok_or(out_of_bounds.clone())? as usize;
            let value_offset = u32_at(data, base + 12).ok_or(out_of_bounds.clone())? as usize;

            let key = c_str_at(data, key_table + key_offset, usize::MAX)
                .ok_or(out_of_bounds.clone())?;
            let value_pos = data_table + value_offset;
            let value = match format {
                FMT_INT32 => SfoValue::Int(u32_at(data, value_pos).ok_or(out_of_bounds)?),
                FMT_UTF8 | FMT_UTF8_SPECIAL => {
                    SfoValue::Text(c_str_at(data, value_pos, len).ok_or(out_of_bounds)?)
                }
                _ => continue,
            };
            values.insert(key, value);
        }

        Ok(Self { values })
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(SfoValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<u32> {
        match self.values.get(key) {
            Some(SfoValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Build a PARAM.SFO block from `(key, value)` pairs.
pub fn build_sfo(entries: &[(&str, SfoValue)]) -> Vec<u8> {
    let mut keys = Vec::new();
    let mut values = Vec::new();
    let mut index = Vec::new();

    for (key, value) in entries {
        let key_offset = keys.len() as u16;
        keys.extend_from_slice(key.as_bytes());
        keys.push(0);

        let value_offset = values.len() as u32;
        let (format, bytes) = match value {
            SfoValue::Int(v) => (FMT_INT32, v.to_le_bytes().to_vec()),
            SfoValue::Text(s) => {
                let mut b = s.as_bytes().to_vec();
                b.push(0);
                (FMT_UTF8, b)
            }
        };
        let len = bytes.len() as u32;
        let max_len = len.next_multiple_of(4);
        values.extend_from_slice(&bytes);
        values.resize(values.len() + (max_len - len) as usize, 0);

        index.extend_from_slice(&key_offset.to_le_bytes());
        index.extend_from_slice(&format.to_le_bytes());
        index.extend_from_slice(&len.to_le_bytes());
        index.extend_from_slice(&max_len.to_le_bytes());
        index.extend_from_slice(&value_offset.to_le_bytes());
    }
    keys.resize(keys.len().next_multiple_of(4), 0);

    let key_table = (HEADER_LEN + index.len()) as u32;
    let data_table = key_table + keys.len() as u32;

    let mut out = Vec::new();
    out.extend_from_slice(SFO_MAGIC);
    out.extend_from_slice(&0x0101u32.to_le_bytes());
    out.extend_from_slice(&key_table.to_le_bytes());
    out.extend_from_slice(&data_table.to_le_bytes());
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    out.extend_from_slice(&index);
    out.extend_from_slice(&keys);
    out.extend_from_slice(&values);
    out
}
