// IAB track files: the container codec
//
// The pipelines only see two capabilities:
// - FrameSink: sequential writer (append frames, then finalize once)
// - FrameSource: random-access reader (count, fetch by index, identity, close)
//
// IabTrackWriter and IabTrackReader implement them over KLV track files
// (layout described in the klv module).

pub mod header;
pub mod index;
pub mod reader;
pub mod session;
pub mod writer;

pub use reader::IabTrackReader;
pub use session::PathLease;
pub use writer::IabTrackWriter;

use crate::frame::Frame;
use crate::identity::ContainerIdentity;
use crate::Result;

/// Sequential frame writer
pub trait FrameSink {
    /// Append one frame after the previous one
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;

    /// Commit the index; no frame may be written afterwards
    fn finalize(&mut self) -> Result<()>;

    /// Frames appended so far
    fn frames_written(&self) -> u32;
}

/// Random-access frame reader
pub trait FrameSource {
    fn frame_count(&self) -> Result<u32>;

    /// Frame at a zero-based index, exactly as written
    fn read_frame(&mut self, index: u32) -> Result<Frame>;

    fn identity(&self) -> Result<ContainerIdentity>;

    /// Release resources; later calls fail
    fn close(&mut self) -> Result<()>;
}
