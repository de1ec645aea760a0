// Extraction pipeline: track file -> frame files
//
// Frames are visited in ascending index order. Either each frame goes to
// its own `<index>.iab` file, or all frames are concatenated into one file.

use crate::track::{FrameSource, IabTrackReader, PathLease};
use crate::{Error, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Extension of per-frame output files
pub const FRAME_FILE_EXTENSION: &str = "iab";

/// Output file name of frame `index`: the decimal index, no padding
pub fn frame_file_name(index: u32) -> String {
    format!("{index}.{FRAME_FILE_EXTENSION}")
}

/// Where extracted frames go
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// One file per frame, named by [`frame_file_name`]
    #[default]
    PerFrame,
    /// All frames concatenated into the named file
    Single(String),
}

/// Outcome of a successful extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractSummary {
    pub frames: u32,
    pub bytes: u64,
    pub outputs: Vec<PathBuf>,
}

/// Write every frame of `source` under `out_dir`
///
/// `out_dir` must already exist. Output paths are claimed like track files,
/// so an output that is the open input track fails with
/// [`Error::AlreadyOpen`] instead of truncating it. The first read or write
/// failure aborts the run; files already written stay on disk.
pub fn extract_frames<S: FrameSource>(
    source: &mut S,
    out_dir: &Path,
    mode: &ExtractMode,
) -> Result<ExtractSummary> {
    let count = source.frame_count()?;
    let mut summary = ExtractSummary::default();

    match mode {
        ExtractMode::PerFrame => {
            for index in 0..count {
                let frame = source.read_frame(index)?;
                let path = out_dir.join(frame_file_name(index));
                let _lease = claim_output(&path)?;
                fs::write(&path, frame.as_bytes()).map_err(|source| Error::OutputFile {
                    path: path.clone(),
                    source,
                })?;

                summary.frames += 1;
                summary.bytes += frame.len() as u64;
                summary.outputs.push(path);
            }
        }
        ExtractMode::Single(name) => {
            let path = out_dir.join(name);
            let output_error = |source| Error::OutputFile {
                path: path.clone(),
                source,
            };

            let _lease = claim_output(&path)?;
            // Created even when the track holds no frames
            let mut out = BufWriter::new(File::create(&path).map_err(output_error)?);
            for index in 0..count {
                let frame = source.read_frame(index)?;
                out.write_all(frame.as_bytes()).map_err(output_error)?;

                summary.frames += 1;
                summary.bytes += frame.len() as u64;
            }
            out.flush().map_err(output_error)?;
            summary.outputs.push(path);
        }
    }

    tracing::debug!(
        dir = %out_dir.display(),
        frames = summary.frames,
        bytes = summary.bytes,
        "Extracted IA frames"
    );
    Ok(summary)
}

/// Own an output path for as long as it is written
fn claim_output(path: &Path) -> Result<PathLease> {
    PathLease::acquire(path).map_err(|e| match e {
        Error::Io(source) => Error::OutputFile {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Open a track file, extract all of its frames, then close it
pub fn unwrap_track(input: &Path, out_dir: &Path, mode: &ExtractMode) -> Result<ExtractSummary> {
    let mut reader = IabTrackReader::open(input)?;
    let summary = extract_frames(&mut reader, out_dir, mode)?;
    reader.close()?;
    Ok(summary)
}
