//! Minimal zip container for Open Packaging Convention documents.
//!
//! Entries are deflated with a fixed timestamp so identical parts always
//! produce identical bytes.

use std::io::Write;

use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};

use super::ExportError;

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIR_SIGNATURE: u32 = 0x0605_4b50;
const VERSION_NEEDED: u16 = 20;
const METHOD_DEFLATE: u16 = 8;
const DOS_TIME: u16 = 0;
/// 1980-01-01, the earliest date a zip entry can carry.
const DOS_DATE: u16 = (1 << 5) | 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackagePart {
    pub name: String,
    pub data: Vec<u8>,
}

impl PackagePart {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

struct CentralEntry {
    name: String,
    crc: u32,
    compressed_size: u32,
    size: u32,
    offset: u32,
}

pub fn write_package(parts: &[PackagePart]) -> Result<Vec<u8>, ExportError> {
    let mut output = Vec::new();
    let mut entries = Vec::with_capacity(parts.len());

    for part in parts {
        let offset = to_u32(output.len())?;
        let mut crc = Crc::new();
        crc.update(&part.data);

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&part.data)?;
        let compressed = encoder.finish()?;

        let entry = CentralEntry {
            name: part.name.clone(),
            crc: crc.sum(),
            compressed_size: to_u32(compressed.len())?,
            size: to_u32(part.data.len())?,
            offset,
        };
        let name_len = to_u16(entry.name.len())?;

        put_u32(&mut output, LOCAL_HEADER_SIGNATURE);
        put_u16(&mut output, VERSION_NEEDED);
        put_u16(&mut output, 0);
        put_u16(&mut output, METHOD_DEFLATE);
        put_u16(&mut output, DOS_TIME);
        put_u16(&mut output, DOS_DATE);
        put_u32(&mut output, entry.crc);
        put_u32(&mut output, entry.compressed_size);
        put_u32(&mut output, entry.size);
        put_u16(&mut output, name_len);
        put_u16(&mut output, 0);
        output.extend_from_slice(entry.name.as_bytes());
        output.extend_from_slice(&compressed);

        entries.push(entry);
    }

    let central_offset = to_u32(output.len())?;
    for entry in &entries {
        put_u32(&mut output, CENTRAL_HEADER_SIGNATURE);
        put_u16(&mut output, VERSION_NEEDED);
        put_u16(&mut output, VERSION_NEEDED);
        put_u16(&mut output, 0);
        put_u16(&mut output, METHOD_DEFLATE);
        put_u16(&mut output, DOS_TIME);
        put_u16(&mut output, DOS_DATE);
        put_u32(&mut output, entry.crc);
        put_u32(&mut output, entry.compressed_size);
        put_u32(&mut output, entry.size);
        put_u16(&mut output, to_u16(entry.name.len())?);
        put_u16(&mut output, 0);
        put_u16(&mut output, 0);
        put_u16(&mut output, 0);
        put_u16(&mut output, 0);
        put_u32(&mut output, 0);
        put_u32(&mut output, entry.offset);
        output.extend_from_slice(entry.name.as_bytes());
    }
    let central_size = to_u32(output.len())? - central_offset;
    let count = to_u16(entries.len())?;

    put_u32(&mut output, END_OF_CENTRAL_DIR_SIGNATURE);
    put_u16(&mut output, 0);
    put_u16(&mut output, 0);
    put_u16(&mut output, count);
    put_u16(&mut output, count);
    put_u32(&mut output, central_size);
    put_u32(&mut output, central_offset);
    put_u16(&mut output, 0);

    tracing::debug!(
        parts = entries.len(),
        bytes = output.len(),
        "packaged document parts"
    );

    Ok(output)
}

fn put_u16(output: &mut Vec<u8>, value: u16) {
    output.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(output: &mut Vec<u8>, value: u32) {
    output.extend_from_slice(&value.to_le_bytes());
}

fn to_u32(value: usize) -> Result<u32, ExportError> {
    u32::try_from(value).map_err(|_| ExportError::PackageTooLarge)
}

fn to_u16(value: usize) -> Result<u16, ExportError> {
    u16::try_from(value).map_err(|_| ExportError::PackageTooLarge)
}

/// Reads back packages produced by [`write_package`].
#[cfg(test)]
pub(crate) fn read_package(bytes: &[u8]) -> Vec<PackagePart> {
    use std::io::Read;

    fn u16_at(bytes: &[u8], at: usize) -> usize {
        u16::from_le_bytes([bytes[at], bytes[at + 1]]) as usize
    }
    fn u32_at(bytes: &[u8], at: usize) -> usize {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
    }

    let mut parts = Vec::new();
    let mut at = 0usize;
    while u32_at(bytes, at) == LOCAL_HEADER_SIGNATURE as usize {
        let compressed_size = u32_at(bytes, at + 18);
        let name_len = u16_at(bytes, at + 26);
        let extra_len = u16_at(bytes, at + 28);
        let name_start = at + 30;
        let data_start = name_start + name_len + extra_len;
        let name = String::from_utf8(bytes[name_start..name_start + name_len].to_vec())
            .expect("utf8 entry name");
        let mut data = Vec::new();
        flate2::read::DeflateDecoder::new(&bytes[data_start..data_start + compressed_size])
            .read_to_end(&mut data)
            .expect("inflate entry");
        parts.push(PackagePart { name, data });
        at = data_start + compressed_size;
    }
    parts
}
