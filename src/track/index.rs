// Footer structures: footer partition pack, index table, random index pack

use crate::identity::EditRate;
use crate::utils::io::{read_be_i32, read_be_u32, read_be_u64};
use crate::{Error, Result};
use std::io::Cursor;

/// Location of one essence element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Byte offset of the essence KLV key from the start of the file
    pub offset: u64,
    /// Frame length in bytes
    pub len: u32,
}

/// Footer partition pack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FooterPartition {
    pub header_offset: u64,
    pub frame_count: u32,
}

impl FooterPartition {
    pub const SIZE: usize = 12;

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..8].copy_from_slice(&self.header_offset.to_be_bytes());
        out[8..12].copy_from_slice(&self.frame_count.to_be_bytes());
        out
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != Self::SIZE {
            return Err(Error::invalid_track_file(format!(
                "footer partition pack is {} bytes, expected {}",
                data.len(),
                Self::SIZE
            )));
        }
        let mut cursor = Cursor::new(data);
        Ok(FooterPartition {
            header_offset: read_be_u64(&mut cursor)?,
            frame_count: read_be_u32(&mut cursor)?,
        })
    }
}

/// Index table segment: one entry per frame, in write order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTable {
    pub edit_rate: EditRate,
    pub entries: Vec<IndexEntry>,
}

impl IndexTable {
    const FIXED_SIZE: usize = 12;
    const ENTRY_SIZE: usize = 12;

    /// Serialized size for the given number of entries
    pub fn encoded_len(entries: usize) -> u64 {
        (Self::FIXED_SIZE + entries * Self::ENTRY_SIZE) as u64
    }

    pub fn encode(&self) -> Vec<u8> {
        Self::encode_entries(self.edit_rate, &self.entries)
    }

    /// Serialize a segment without taking ownership of the entries
    pub fn encode_entries(edit_rate: EditRate, entries: &[IndexEntry]) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::encoded_len(entries.len()) as usize);
        out.extend_from_slice(&edit_rate.numerator.to_be_bytes());
        out.extend_from_slice(&edit_rate.denominator.to_be_bytes());
        out.extend_from_slice(&(entries.len() as u32).to_be_bytes());
        for entry in entries {
            out.extend_from_slice(&entry.offset.to_be_bytes());
            out.extend_from_slice(&entry.len.to_be_bytes());
        }
        out
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let truncated = || Error::invalid_track_file("index table segment is truncated");
        let mut cursor = Cursor::new(data);

        let numerator = read_be_i32(&mut cursor).map_err(|_| truncated())?;
        let denominator = read_be_i32(&mut cursor).map_err(|_| truncated())?;
        let count = read_be_u32(&mut cursor).map_err(|_| truncated())? as usize;

        if data.len() as u64 != Self::encoded_len(count) {
            return Err(Error::invalid_track_file(format!(
                "index table segment of {} bytes cannot hold {count} entries",
                data.len()
            )));
        }

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(IndexEntry {
                offset: read_be_u64(&mut cursor)?,
                len: read_be_u32(&mut cursor)?,
            });
        }

        Ok(IndexTable {
            edit_rate: EditRate {
                numerator,
                denominator,
            },
            entries,
        })
    }
}

/// Random index pack: partition offsets, followed by its own total length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomIndexPack {
    pub header_offset: u64,
    pub footer_offset: u64,
}

impl RandomIndexPack {
    /// Value size: two offsets plus the overall length field
    pub const VALUE_SIZE: usize = 20;
    /// Key + 1-byte BER length + value
    pub const PACKET_SIZE: u32 = 16 + 1 + Self::VALUE_SIZE as u32;

    pub fn encode(&self) -> [u8; Self::VALUE_SIZE] {
        let mut out = [0u8; Self::VALUE_SIZE];
        out[0..8].copy_from_slice(&self.header_offset.to_be_bytes());
        out[8..16].copy_from_slice(&self.footer_offset.to_be_bytes());
        out[16..20].copy_from_slice(&Self::PACKET_SIZE.to_be_bytes());
        out
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != Self::VALUE_SIZE {
            return Err(Error::invalid_track_file(format!(
                "random index pack is {} bytes, expected {}",
                data.len(),
                Self::VALUE_SIZE
            )));
        }
        let mut cursor = Cursor::new(data);
        let header_offset = read_be_u64(&mut cursor)?;
        let footer_offset = read_be_u64(&mut cursor)?;
        let overall = read_be_u32(&mut cursor)?;
        if overall != Self::PACKET_SIZE {
            return Err(Error::invalid_track_file(format!(
                "random index pack length {overall} does not match its packet"
            )));
        }
        Ok(RandomIndexPack {
            header_offset,
            footer_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_table() {
        let table = IndexTable {
            edit_rate: EditRate::FPS_24,
            entries: vec![
                IndexEntry { offset: 100, len: 1034 },
                IndexEntry { offset: 1153, len: 1034 },
            ],
        };
        let data = table.encode();
        assert_eq!(data.len() as u64, IndexTable::encoded_len(2));
        assert_eq!(IndexTable::decode(&data).unwrap(), table);
    }

    #[test]
    fn test_empty_index_table() {
        let table = IndexTable {
            edit_rate: EditRate::FPS_24,
            entries: Vec::new(),
        };
        let decoded = IndexTable::decode(&table.encode()).unwrap();
        assert!(decoded.entries.is_empty());
    }

    #[test]
    fn test_index_table_rejects_count_mismatch() {
        let mut data = IndexTable {
            edit_rate: EditRate::FPS_24,
            entries: vec![IndexEntry { offset: 1, len: 1 }],
        }
        .encode();
        // Claim two entries while carrying one
        data[11] = 2;
        assert!(IndexTable::decode(&data).is_err());
        assert!(IndexTable::decode(&data[..5]).is_err());
    }

    #[test]
    fn test_random_index_pack() {
        let rip = RandomIndexPack {
            header_offset: 0,
            footer_offset: 4096,
        };
        let data = rip.encode();
        assert_eq!(&data[16..20], &37u32.to_be_bytes());
        assert_eq!(RandomIndexPack::decode(&data).unwrap(), rip);
    }

    #[test]
    fn test_footer_partition() {
        let footer = FooterPartition {
            header_offset: 0,
            frame_count: 7,
        };
        assert_eq!(FooterPartition::decode(&footer.encode()).unwrap(), footer);
        assert!(FooterPartition::decode(&[0u8; 3]).is_err());
    }
}
