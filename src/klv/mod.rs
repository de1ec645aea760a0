// KLV (key-length-value) coding
//
// Every structure in a track file is a KLV packet:
// - Key: 16-byte SMPTE universal label
// - Length: BER-encoded value length
// - Value: payload bytes
//
// Track file layout:
// 1. Header partition pack (status byte tells whether the file was finalized)
// 2. Identification set (local set)
// 3. IAB soundfield descriptor set (local set)
// 4. One essence element per IA frame
// 5. Footer partition pack
// 6. Index table segment
// 7. Random index pack (its own length in the last 4 bytes of the file)
//
// Reference:
// - SMPTE ST 336: Data Encoding Protocol Using Key-Length-Value
// - SMPTE ST 377-1: Material Exchange Format (MXF) File Format Specification

pub mod ber;
pub mod local_set;

pub use ber::{encode_ber_length, read_ber_length};
pub use local_set::LocalSet;

use crate::identity::Ul;
use crate::utils::io::read_array;
use std::io::{self, Read, Write};

/// Byte of the header partition key that carries the partition status
const PARTITION_STATUS_BYTE: usize = 14;

/// Header partition pack key, status byte zeroed
pub const HEADER_PARTITION_KEY: Ul = Ul([
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, 0x02, 0x00, 0x00,
]);

pub const IDENTIFICATION_SET_KEY: Ul = Ul([
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0d, 0x01, 0x01, 0x01, 0x01, 0x01, 0x30, 0x00,
]);

pub const SOUNDFIELD_DESCRIPTOR_KEY: Ul = Ul([
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0d, 0x01, 0x01, 0x01, 0x01, 0x01, 0x7b, 0x00,
]);

/// IAB essence element, one per frame
pub const IAB_ESSENCE_KEY: Ul = Ul([
    0x06, 0x0e, 0x2b, 0x34, 0x01, 0x02, 0x01, 0x01, 0x0d, 0x01, 0x03, 0x01, 0x16, 0x01, 0x01, 0x00,
]);

pub const FOOTER_PARTITION_KEY: Ul = Ul([
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, 0x04, 0x04, 0x00,
]);

pub const INDEX_TABLE_SEGMENT_KEY: Ul = Ul([
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, 0x10, 0x01, 0x00,
]);

pub const RANDOM_INDEX_PACK_KEY: Ul = Ul([
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, 0x11, 0x01, 0x00,
]);

/// Header partition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStatus {
    OpenIncomplete = 1,
    ClosedIncomplete = 2,
    OpenComplete = 3,
    ClosedComplete = 4,
}

impl PartitionStatus {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(PartitionStatus::OpenIncomplete),
            2 => Some(PartitionStatus::ClosedIncomplete),
            3 => Some(PartitionStatus::OpenComplete),
            4 => Some(PartitionStatus::ClosedComplete),
            _ => None,
        }
    }
}

/// Header partition key carrying the given status
pub fn header_partition_key(status: PartitionStatus) -> Ul {
    let mut key = HEADER_PARTITION_KEY;
    key.0[PARTITION_STATUS_BYTE] = status as u8;
    key
}

/// Status of a header partition key, None if the key is something else
pub fn header_partition_status(key: &Ul) -> Option<PartitionStatus> {
    let mut masked = *key;
    masked.0[PARTITION_STATUS_BYTE] = 0;
    if masked != HEADER_PARTITION_KEY {
        return None;
    }
    PartitionStatus::from_byte(key.0[PARTITION_STATUS_BYTE])
}

/// Key and value length of a KLV packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KlvHeader {
    pub key: Ul,
    pub len: u64,
    /// Key plus length field, in bytes
    pub header_len: usize,
}

impl KlvHeader {
    /// Read a KLV key and length
    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        let key = Ul(read_array::<_, 16>(reader)?);
        let (len, len_size) = read_ber_length(reader)?;
        Ok(KlvHeader {
            key,
            len,
            header_len: Ul::LEN + len_size,
        })
    }

    /// Write a KLV key and length, returning the bytes written
    pub fn write<W: Write>(writer: &mut W, key: &Ul, len: u64) -> io::Result<usize> {
        let ber = encode_ber_length(len);
        writer.write_all(key.as_bytes())?;
        writer.write_all(&ber)?;
        Ok(Ul::LEN + ber.len())
    }
}

/// Write a complete KLV packet, returning the bytes written
pub fn write_klv<W: Write>(writer: &mut W, key: &Ul, value: &[u8]) -> io::Result<u64> {
    let header_len = KlvHeader::write(writer, key, value.len() as u64)?;
    writer.write_all(value)?;
    Ok((header_len + value.len()) as u64)
}
