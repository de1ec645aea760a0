//! Sequential IAB track file writer.

use super::header::{encode_descriptor, encode_identification, PartitionPack};
use super::index::{FooterPartition, IndexEntry, IndexTable, RandomIndexPack};
use super::session::PathLease;
use super::FrameSink;
use crate::identity::ContainerIdentity;
use crate::klv::{
    header_partition_key, write_klv, KlvHeader, PartitionStatus, FOOTER_PARTITION_KEY,
    IAB_ESSENCE_KEY, IDENTIFICATION_SET_KEY, INDEX_TABLE_SEGMENT_KEY, RANDOM_INDEX_PACK_KEY,
    SOUNDFIELD_DESCRIPTOR_KEY,
};
use crate::{Error, Result};
use chrono::Utc;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Open,
    Finalized,
    /// An earlier write failed; the output is unusable
    Poisoned,
}

/// IAB track file writer.
///
/// Frames are appended strictly in call order. The file only becomes a valid
/// track file once [`IabTrackWriter::finalize`] succeeds; until then its
/// header partition is marked open and incomplete and readers reject it.
pub struct IabTrackWriter<W: Write + Seek> {
    out: W,
    state: WriterState,
    identity: ContainerIdentity,
    /// Offset of the header partition KLV key
    header_offset: u64,
    /// Offset of the header partition pack value
    header_value_offset: u64,
    /// Current write position
    position: u64,
    entries: Vec<IndexEntry>,
    _lease: Option<PathLease>,
}

impl IabTrackWriter<BufWriter<File>> {
    /// Create a track file at `path`, truncating any existing file.
    ///
    /// The identity is validated before the file is touched.
    pub fn create<P: AsRef<Path>>(path: P, identity: &ContainerIdentity) -> Result<Self> {
        let path = path.as_ref();
        identity.validate()?;

        let lease = PathLease::acquire(path)?;
        let file = File::create(path)?;
        let mut writer = Self::new(BufWriter::new(file), identity)?;
        writer._lease = Some(lease);

        tracing::info!(
            path = %path.display(),
            asset_uuid = %identity.asset_uuid(),
            edit_rate = %identity.edit_rate,
            "Opened IAB track file for writing"
        );
        Ok(writer)
    }
}

impl<W: Write + Seek> IabTrackWriter<W> {
    /// Start a track file at the current position of `out`.
    ///
    /// Writes the header partition and header metadata immediately.
    pub fn new(mut out: W, identity: &ContainerIdentity) -> Result<Self> {
        identity.validate()?;

        let header_offset = out.stream_position()?;
        let identification = encode_identification(&identity.writer_info, Utc::now())?;
        let descriptor = encode_descriptor(identity)?;

        let header_key = header_partition_key(PartitionStatus::OpenIncomplete);
        let header_len = KlvHeader::write(&mut out, &header_key, PartitionPack::SIZE as u64)?;
        out.write_all(&PartitionPack::open().encode())?;

        let mut position = header_offset + (header_len + PartitionPack::SIZE) as u64;
        position += write_klv(&mut out, &IDENTIFICATION_SET_KEY, &identification)?;
        position += write_klv(&mut out, &SOUNDFIELD_DESCRIPTOR_KEY, &descriptor)?;

        Ok(IabTrackWriter {
            out,
            state: WriterState::Open,
            identity: identity.clone(),
            header_offset,
            header_value_offset: header_offset + header_len as u64,
            position,
            entries: Vec::new(),
            _lease: None,
        })
    }

    /// Append one frame.
    pub fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.check_open()?;

        if frame.is_empty() {
            return Err(Error::EmptyFrame);
        }
        let len = u32::try_from(frame.len()).map_err(|_| Error::FrameTooLarge { len: frame.len() })?;
        if self.entries.len() >= u32::MAX as usize {
            return Err(Error::TooManyFrames);
        }

        let offset = self.position;
        match write_klv(&mut self.out, &IAB_ESSENCE_KEY, frame) {
            Ok(written) => {
                self.position += written;
                self.entries.push(IndexEntry { offset, len });
                tracing::debug!(index = self.entries.len() - 1, len, offset, "Wrote IA frame");
                Ok(())
            }
            Err(e) => {
                self.state = WriterState::Poisoned;
                tracing::error!(index = self.entries.len(), "Frame write failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Identity the track file was created with.
    pub fn identity(&self) -> &ContainerIdentity {
        &self.identity
    }

    /// Write the footer and index, then mark the header closed and complete.
    ///
    /// No frame can be written afterwards.
    pub fn finalize(&mut self) -> Result<()> {
        self.check_open()?;

        if let Err(e) = self.write_footer() {
            self.state = WriterState::Poisoned;
            tracing::error!("Finalize failed: {}", e);
            return Err(e);
        }

        self.state = WriterState::Finalized;
        tracing::info!(
            frames = self.entries.len(),
            bytes = self.position,
            "Finalized IAB track file"
        );
        Ok(())
    }

    /// Recover the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn check_open(&self) -> Result<()> {
        match self.state {
            WriterState::Open => Ok(()),
            WriterState::Finalized => Err(Error::Finalized),
            WriterState::Poisoned => Err(Error::Poisoned),
        }
    }

    fn write_footer(&mut self) -> Result<()> {
        let frame_count = self.entries.len() as u32;
        let footer_offset = self.position;

        let footer = FooterPartition {
            header_offset: self.header_offset,
            frame_count,
        };
        let index = IndexTable::encode_entries(self.identity.edit_rate, &self.entries);
        let rip = RandomIndexPack {
            header_offset: self.header_offset,
            footer_offset,
        };

        let mut position = footer_offset;
        position += write_klv(&mut self.out, &FOOTER_PARTITION_KEY, &footer.encode())?;
        position += write_klv(&mut self.out, &INDEX_TABLE_SEGMENT_KEY, &index)?;
        position += write_klv(&mut self.out, &RANDOM_INDEX_PACK_KEY, &rip.encode())?;

        // Rewrite the header partition in place
        let pack = PartitionPack {
            footer_offset,
            frame_count,
            ..PartitionPack::open()
        };
        self.out.seek(SeekFrom::Start(self.header_value_offset))?;
        self.out.write_all(&pack.encode())?;
        self.out.seek(SeekFrom::Start(self.header_offset))?;
        self.out
            .write_all(header_partition_key(PartitionStatus::ClosedComplete).as_bytes())?;
        self.out.seek(SeekFrom::Start(position))?;
        self.out.flush()?;

        self.position = position;
        Ok(())
    }
}

impl<W: Write + Seek> FrameSink for IabTrackWriter<W> {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        IabTrackWriter::write_frame(self, frame)
    }

    fn finalize(&mut self) -> Result<()> {
        IabTrackWriter::finalize(self)
    }

    fn frames_written(&self) -> u32 {
        IabTrackWriter::frames_written(self)
    }
}
