//! Random-access IAB track file reader.

use super::header::{decode_descriptor, decode_identification, PartitionPack};
use super::index::{FooterPartition, IndexEntry, IndexTable, RandomIndexPack};
use super::session::PathLease;
use super::FrameSource;
use crate::frame::Frame;
use crate::identity::{ContainerIdentity, Ul};
use crate::klv::{
    header_partition_status, KlvHeader, PartitionStatus, FOOTER_PARTITION_KEY, IAB_ESSENCE_KEY,
    IDENTIFICATION_SET_KEY, INDEX_TABLE_SEGMENT_KEY, RANDOM_INDEX_PACK_KEY,
    SOUNDFIELD_DESCRIPTOR_KEY,
};
use crate::utils::io::{read_be_u32, stream_len};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Maximum header metadata set size (1 MB) to prevent OOM on malformed files.
const MAX_METADATA_SIZE: u64 = 1024 * 1024;

/// IAB track file reader.
///
/// Opening parses the header metadata and the whole index table, so frame
/// count and identity queries never touch the file again.
pub struct IabTrackReader<R: Read + Seek> {
    /// None once closed
    source: Option<R>,
    file_len: u64,
    identity: ContainerIdentity,
    modification_date: Option<DateTime<Utc>>,
    entries: Vec<IndexEntry>,
    _lease: Option<PathLease>,
}

impl IabTrackReader<BufReader<File>> {
    /// Open a finalized track file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let lease = PathLease::acquire(path)?;
        let file = File::open(path)?;
        let mut reader = Self::new(BufReader::new(file))?;
        reader._lease = Some(lease);

        tracing::info!(
            path = %path.display(),
            frames = reader.entries.len(),
            asset_uuid = %reader.identity.asset_uuid(),
            "Opened IAB track file for reading"
        );
        Ok(reader)
    }
}

impl<R: Read + Seek> IabTrackReader<R> {
    /// Parse a track file starting at the current position of `source`.
    ///
    /// Offsets recorded in the file are absolute stream positions, matching
    /// what [`IabTrackWriter::new`](super::IabTrackWriter::new) writes.
    pub fn new(mut source: R) -> Result<Self> {
        let header_offset = source.stream_position()?;
        let file_len = stream_len(&mut source)?;

        // Header partition
        let header = read_klv_header(&mut source, "header partition pack")?;
        let status = header_partition_status(&header.key)
            .ok_or_else(|| Error::invalid_track_file("missing header partition pack"))?;
        if status != PartitionStatus::ClosedComplete {
            return Err(Error::Incomplete);
        }
        let pack = PartitionPack::decode(&read_value(
            &mut source,
            &header,
            "header partition pack",
        )?)?;

        // Header metadata
        let header = read_klv_header(&mut source, "identification set")?;
        expect_key(&header, &IDENTIFICATION_SET_KEY, "identification set")?;
        let (writer_info, modification_date) =
            decode_identification(&read_value(&mut source, &header, "identification set")?)?;

        let header = read_klv_header(&mut source, "soundfield descriptor")?;
        expect_key(&header, &SOUNDFIELD_DESCRIPTOR_KEY, "soundfield descriptor")?;
        let (descriptor, edit_rate, conformance_labels) =
            decode_descriptor(&read_value(&mut source, &header, "soundfield descriptor")?)?;

        // Footer, located through the random index pack
        let rip = read_random_index_pack(&mut source, file_len)?;
        if rip.footer_offset != pack.footer_offset || rip.header_offset != header_offset {
            return Err(Error::invalid_track_file(
                "random index pack disagrees with the header partition",
            ));
        }
        if pack.footer_offset <= header_offset || pack.footer_offset >= file_len {
            return Err(Error::invalid_track_file("footer offset beyond end of file"));
        }
        source.seek(SeekFrom::Start(pack.footer_offset))?;

        let header = read_klv_header(&mut source, "footer partition pack")?;
        expect_key(&header, &FOOTER_PARTITION_KEY, "footer partition pack")?;
        let footer = FooterPartition::decode(&read_value(
            &mut source,
            &header,
            "footer partition pack",
        )?)?;

        let header = read_klv_header(&mut source, "index table segment")?;
        expect_key(&header, &INDEX_TABLE_SEGMENT_KEY, "index table segment")?;
        if header.len != IndexTable::encoded_len(pack.frame_count as usize)
            || header.len > file_len - pack.footer_offset
        {
            return Err(Error::invalid_track_file(format!(
                "index table segment of {} bytes does not match {} frames",
                header.len, pack.frame_count
            )));
        }
        let index = IndexTable::decode(&read_value(&mut source, &header, "index table segment")?)?;

        if footer.header_offset != header_offset {
            return Err(Error::invalid_track_file(
                "footer partition points at another header partition",
            ));
        }
        if footer.frame_count != pack.frame_count {
            return Err(Error::invalid_track_file(format!(
                "frame count mismatch: header {}, footer {}",
                pack.frame_count, footer.frame_count
            )));
        }
        if let Some(entry) = index
            .entries
            .iter()
            .find(|e| e.offset.saturating_add(e.len as u64) > pack.footer_offset)
        {
            return Err(Error::invalid_track_file(format!(
                "index entry at offset {} overruns the essence",
                entry.offset
            )));
        }

        let identity = ContainerIdentity {
            writer_info,
            descriptor,
            edit_rate,
            conformance_labels,
        };
        if index.edit_rate != identity.edit_rate {
            tracing::warn!(
                descriptor = %identity.edit_rate,
                index = %index.edit_rate,
                "Index table edit rate differs from the descriptor"
            );
        }

        Ok(IabTrackReader {
            source: Some(source),
            file_len,
            identity,
            modification_date,
            entries: index.entries,
            _lease: None,
        })
    }

    /// Total number of frames.
    pub fn frame_count(&self) -> Result<u32> {
        self.check_open()?;
        Ok(self.entries.len() as u32)
    }

    /// Read the frame at `index`, byte for byte as written.
    pub fn read_frame(&mut self, index: u32) -> Result<Frame> {
        let count = self.frame_count()?;
        let entry = *self
            .entries
            .get(index as usize)
            .ok_or(Error::FrameOutOfRange { index, count })?;
        let source = self.source.as_mut().ok_or(Error::Closed)?;

        source.seek(SeekFrom::Start(entry.offset))?;
        let header = read_klv_header(source, "essence element")?;
        if header.key != IAB_ESSENCE_KEY || header.len != entry.len as u64 {
            return Err(Error::invalid_track_file(format!(
                "essence element {index} does not match the index table"
            )));
        }

        let mut data = vec![0u8; entry.len as usize];
        source.read_exact(&mut data).map_err(|e| truncated(e, "essence element"))?;
        tracing::trace!(index, len = entry.len, "Read IA frame");
        Ok(Frame::new(data))
    }

    /// Identity recorded when the file was created.
    pub fn identity(&self) -> Result<ContainerIdentity> {
        self.check_open()?;
        Ok(self.identity.clone())
    }

    /// Creation time recorded by the writer, if any.
    pub fn modification_date(&self) -> Option<DateTime<Utc>> {
        self.modification_date
    }

    /// Size of the track file in bytes.
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Release the file; every later call fails with [`Error::Closed`].
    pub fn close(&mut self) -> Result<()> {
        self.source.take().ok_or(Error::Closed)?;
        self._lease = None;
        Ok(())
    }

    fn check_open(&self) -> Result<()> {
        match self.source {
            Some(_) => Ok(()),
            None => Err(Error::Closed),
        }
    }
}

impl<R: Read + Seek> FrameSource for IabTrackReader<R> {
    fn frame_count(&self) -> Result<u32> {
        IabTrackReader::frame_count(self)
    }

    fn read_frame(&mut self, index: u32) -> Result<Frame> {
        IabTrackReader::read_frame(self, index)
    }

    fn identity(&self) -> Result<ContainerIdentity> {
        IabTrackReader::identity(self)
    }

    fn close(&mut self) -> Result<()> {
        IabTrackReader::close(self)
    }
}

/// Map short reads and malformed lengths to structural errors
fn truncated(e: io::Error, what: &str) -> Error {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::invalid_track_file(format!("truncated {what}")),
        io::ErrorKind::InvalidData => Error::invalid_track_file(format!("malformed {what}: {e}")),
        _ => Error::Io(e),
    }
}

fn read_klv_header<R: Read>(source: &mut R, what: &str) -> Result<KlvHeader> {
    KlvHeader::read(source).map_err(|e| truncated(e, what))
}

fn expect_key(header: &KlvHeader, key: &Ul, what: &str) -> Result<()> {
    if header.key != *key {
        return Err(Error::invalid_track_file(format!(
            "expected {what}, found key {}",
            header.key
        )));
    }
    Ok(())
}

/// Read a metadata value, refusing oversized ones
fn read_value<R: Read>(source: &mut R, header: &KlvHeader, what: &str) -> Result<Vec<u8>> {
    if header.len > MAX_METADATA_SIZE && header.key != INDEX_TABLE_SEGMENT_KEY {
        return Err(Error::invalid_track_file(format!(
            "{what} of {} bytes exceeds maximum {MAX_METADATA_SIZE}",
            header.len
        )));
    }
    let mut value = vec![0u8; header.len as usize];
    source.read_exact(&mut value).map_err(|e| truncated(e, what))?;
    Ok(value)
}

/// Locate the random index pack from its length in the last 4 bytes
fn read_random_index_pack<R: Read + Seek>(source: &mut R, file_len: u64) -> Result<RandomIndexPack> {
    if file_len < RandomIndexPack::PACKET_SIZE as u64 {
        return Err(Error::invalid_track_file("missing random index pack"));
    }

    source.seek(SeekFrom::Start(file_len - 4))?;
    let overall = read_be_u32(source).map_err(|e| truncated(e, "random index pack"))?;
    if overall != RandomIndexPack::PACKET_SIZE {
        return Err(Error::invalid_track_file("missing random index pack"));
    }

    source.seek(SeekFrom::Start(file_len - overall as u64))?;
    let header = read_klv_header(source, "random index pack")?;
    expect_key(&header, &RANDOM_INDEX_PACK_KEY, "random index pack")?;
    RandomIndexPack::decode(&read_value(source, &header, "random index pack")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::EditRate;
    use crate::track::IabTrackWriter;
    use crate::klv::header_partition_key;
    use crate::ErrorKind;
    use std::io::{Cursor, Write};
    use uuid::Uuid;

    fn frame_with_fill(fill: u8) -> Vec<u8> {
        let mut frame = vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x40, 0x00];
        frame.extend(std::iter::repeat(fill).take(1024));
        frame
    }

    fn write_track(identity: &ContainerIdentity, frames: &[Vec<u8>]) -> Vec<u8> {
        let mut writer = IabTrackWriter::new(Cursor::new(Vec::new()), identity).unwrap();
        for frame in frames {
            writer.write_frame(frame).unwrap();
        }
        writer.finalize().unwrap();
        writer.into_inner().into_inner()
    }

    #[test]
    fn test_two_frame_round_trip() {
        let frame_1 = frame_with_fill(0x11);
        let frame_2 = frame_with_fill(0x22);
        assert_eq!(frame_1.len(), 1034);

        let bytes = write_track(&ContainerIdentity::default(), &[frame_1.clone(), frame_2.clone()]);
        let mut reader = IabTrackReader::new(Cursor::new(bytes)).unwrap();

        assert_eq!(reader.frame_count().unwrap(), 2);
        let first = reader.read_frame(0).unwrap();
        assert_eq!(first.len(), 1034);
        assert_eq!(first.as_bytes(), &frame_1[..]);
        assert_eq!(reader.read_frame(1).unwrap().as_bytes(), &frame_2[..]);
        // Arbitrary order
        assert_eq!(reader.read_frame(0).unwrap().as_bytes(), &frame_1[..]);
    }

    #[test]
    fn test_duplicates_keep_their_positions() {
        let a = vec![0xaa; 5];
        let b = vec![0xbb; 7];
        let bytes = write_track(&ContainerIdentity::default(), &[a.clone(), b.clone(), a.clone()]);
        let mut reader = IabTrackReader::new(Cursor::new(bytes)).unwrap();

        assert_eq!(reader.frame_count().unwrap(), 3);
        assert_eq!(reader.read_frame(0).unwrap().as_bytes(), &a[..]);
        assert_eq!(reader.read_frame(1).unwrap().as_bytes(), &b[..]);
        assert_eq!(reader.read_frame(2).unwrap().as_bytes(), &a[..]);
        assert_ne!(reader.entries[0].offset, reader.entries[2].offset);
    }

    #[test]
    fn test_out_of_range() {
        let bytes = write_track(&ContainerIdentity::default(), &[vec![1], vec![2]]);
        let mut reader = IabTrackReader::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(
            reader.read_frame(2),
            Err(Error::FrameOutOfRange { index: 2, count: 2 })
        ));
        assert!(matches!(
            reader.read_frame(u32::MAX),
            Err(Error::FrameOutOfRange { .. })
        ));
    }

    #[test]
    fn test_empty_track() {
        let bytes = write_track(&ContainerIdentity::default(), &[]);
        let mut reader = IabTrackReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.frame_count().unwrap(), 0);
        assert!(matches!(reader.read_frame(0), Err(Error::FrameOutOfRange { .. })));
    }

    #[test]
    fn test_identity_round_trip() {
        let asset = Uuid::parse_str("8538b543169743dd9a08c6d8b4b1b7df").unwrap();
        let mut identity = ContainerIdentity::default()
            .with_asset_uuid(asset)
            .with_spoken_language("de-CH")
            .with_edit_rate(EditRate::new(48, 1).unwrap());
        identity.writer_info.company_name = "Example Studio".to_string();
        identity.writer_info.product_version = "2.0".to_string();

        let before = Utc::now();
        let bytes = write_track(&identity, &[vec![9; 3]]);
        let reader = IabTrackReader::new(Cursor::new(bytes)).unwrap();

        assert_eq!(reader.identity().unwrap(), identity);
        let date = reader.modification_date().unwrap();
        assert!(date.timestamp_millis() >= before.timestamp_millis());
    }

    #[test]
    fn test_unfinalized_track_rejected() {
        let mut writer =
            IabTrackWriter::new(Cursor::new(Vec::new()), &ContainerIdentity::default()).unwrap();
        writer.write_frame(&[1, 2, 3]).unwrap();
        let bytes = writer.into_inner().into_inner();

        assert!(matches!(IabTrackReader::new(Cursor::new(bytes)), Err(Error::Incomplete)));
    }

    #[test]
    fn test_garbage_rejected() {
        let err = IabTrackReader::new(Cursor::new(vec![0u8; 64])).err().unwrap();
        assert!(matches!(err, Error::InvalidTrackFile(_)));

        let err = IabTrackReader::new(Cursor::new(vec![0x06, 0x0e])).err().unwrap();
        assert!(matches!(err, Error::InvalidTrackFile(_)));
    }

    #[test]
    fn test_truncated_track_rejected() {
        let bytes = write_track(&ContainerIdentity::default(), &[vec![5; 100]]);
        let cut = bytes[..bytes.len() - 10].to_vec();
        assert!(IabTrackReader::new(Cursor::new(cut)).is_err());
    }

    #[test]
    fn test_corrupt_essence_key_detected() {
        let bytes = write_track(&ContainerIdentity::default(), &[vec![5; 100]]);
        let mut reader = IabTrackReader::new(Cursor::new(bytes.clone())).unwrap();
        let offset = reader.entries[0].offset as usize;
        reader.close().unwrap();

        let mut corrupt = bytes;
        corrupt[offset + 15] ^= 0xff;
        let mut reader = IabTrackReader::new(Cursor::new(corrupt)).unwrap();
        assert!(matches!(reader.read_frame(0), Err(Error::InvalidTrackFile(_))));
    }

    #[test]
    fn test_track_after_leading_bytes() {
        let mut cursor = Cursor::new(Vec::new());
        cursor.write_all(b"prefix").unwrap();
        let mut writer = IabTrackWriter::new(cursor, &ContainerIdentity::default()).unwrap();
        writer.write_frame(&[7; 8]).unwrap();
        writer.write_frame(&[9; 3]).unwrap();
        writer.finalize().unwrap();

        let mut cursor = writer.into_inner();
        cursor.set_position(6);
        let mut reader = IabTrackReader::new(cursor).unwrap();
        assert_eq!(reader.frame_count().unwrap(), 2);
        assert_eq!(reader.read_frame(0).unwrap().as_bytes(), &[7; 8]);
        assert_eq!(reader.read_frame(1).unwrap().as_bytes(), &[9; 3]);

        // Parsing from the wrong position finds no header
        let mut cursor = Cursor::new(write_track(&ContainerIdentity::default(), &[vec![1]]));
        cursor.set_position(3);
        assert!(matches!(IabTrackReader::new(cursor), Err(Error::InvalidTrackFile(_))));
    }

    #[test]
    fn test_malformed_ber_length_is_codec_error() {
        let mut bytes = header_partition_key(PartitionStatus::ClosedComplete).0.to_vec();
        bytes.push(0x80);
        bytes.extend_from_slice(&[0; 40]);

        let err = IabTrackReader::new(Cursor::new(bytes)).err().unwrap();
        assert!(matches!(err, Error::InvalidTrackFile(_)));
        assert_eq!(err.kind(), ErrorKind::Codec);
    }

    #[test]
    fn test_operations_fail_after_close() {
        let bytes = write_track(&ContainerIdentity::default(), &[vec![1]]);
        let mut reader = IabTrackReader::new(Cursor::new(bytes)).unwrap();
        reader.close().unwrap();

        assert!(matches!(reader.frame_count(), Err(Error::Closed)));
        assert!(matches!(reader.read_frame(0), Err(Error::Closed)));
        assert!(matches!(reader.identity(), Err(Error::Closed)));
        assert!(matches!(reader.close(), Err(Error::Closed)));
    }
}
