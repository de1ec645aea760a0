//! iab-imf - wraps immersive audio bitstream (IAB) frames into indexed
//! track files and unwraps them again.
//!
//! A track file holds an ordered sequence of opaque IA frames plus the
//! identity recorded when it was created. Frames are appended once through
//! a [`FrameSink`] and read back in any order through a [`FrameSource`].
//!
//! ```no_run
//! use iab_imf::{ContainerIdentity, IabTrackReader, IabTrackWriter};
//!
//! # fn main() -> iab_imf::Result<()> {
//! let mut writer = IabTrackWriter::create("track.mxf", &ContainerIdentity::default())?;
//! writer.write_frame(b"first frame")?;
//! writer.finalize()?;
//! drop(writer);
//!
//! let mut reader = IabTrackReader::open("track.mxf")?;
//! assert_eq!(reader.frame_count()?, 1);
//! assert_eq!(reader.read_frame(0)?.as_bytes(), b"first frame");
//! reader.close()?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod error;
pub mod frame;
pub mod identity;
pub mod klv;
pub mod pipeline;
pub mod track;
pub mod utils;

pub use error::{Error, ErrorKind, Result};
pub use frame::Frame;
pub use identity::{ContainerIdentity, EditRate};
pub use track::{FrameSink, FrameSource, IabTrackReader, IabTrackWriter};
