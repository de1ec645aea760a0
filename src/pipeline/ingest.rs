// Ingest pipeline: frame files -> track file
//
// Each input file becomes exactly one frame, read whole into memory. The
// first failure aborts the run; the unfinalized output is left marked
// incomplete and no reader accepts it.

use super::scanner::{scan_frame_directory, ScanOptions};
use crate::identity::ContainerIdentity;
use crate::track::{FrameSink, IabTrackWriter};
use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Outcome of a successful ingest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub frames: u32,
    pub bytes: u64,
}

/// Write every file of `files`, in order, as one frame each, then finalize
pub fn ingest_frames<S, P>(sink: &mut S, files: &[P]) -> Result<IngestSummary>
where
    S: FrameSink,
    P: AsRef<Path>,
{
    let mut summary = IngestSummary::default();

    for path in files {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| Error::FrameFile {
            path: path.to_path_buf(),
            source,
        })?;

        if let Err(e) = sink.write_frame(&data) {
            tracing::error!(path = %path.display(), "Write error frame: {}", e);
            tracing::warn!(
                frames = sink.frames_written(),
                "Abandoning track file, output left incomplete"
            );
            return Err(e);
        }

        summary.frames += 1;
        summary.bytes += data.len() as u64;
        tracing::debug!(path = %path.display(), len = data.len(), "Wrapped IA frame");
    }

    sink.finalize()?;
    Ok(summary)
}

/// Wrap a directory of IA frames into a new track file
///
/// The directory is scanned before the output is created, so an unreadable
/// input directory leaves no file behind.
pub fn wrap_directory(
    input_dir: &Path,
    output: &Path,
    identity: &ContainerIdentity,
    options: &ScanOptions,
) -> Result<IngestSummary> {
    let files = scan_frame_directory(input_dir, options)?;
    if files.is_empty() {
        tracing::warn!(dir = %input_dir.display(), "No IA frames found, writing an empty track file");
    }

    let mut writer = IabTrackWriter::create(output, identity)?;
    ingest_frames(&mut writer, &files)
}
