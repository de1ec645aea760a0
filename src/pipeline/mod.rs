// Directory-level pipelines built on the track codec
//
// - scanner: which frame files to wrap, and in which order
// - ingest: frame files -> track file (FrameSink)
// - extract: track file -> frame files (FrameSource)

pub mod extract;
pub mod ingest;
pub mod scanner;

pub use extract::{extract_frames, frame_file_name, unwrap_track, ExtractMode, ExtractSummary};
pub use ingest::{ingest_frames, wrap_directory, IngestSummary};
pub use scanner::{natural_cmp, scan_frame_directory, FrameOrder, ScanOptions};
