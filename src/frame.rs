// IA frame: one opaque access unit of immersive audio bitstream
//
// Frames are never parsed. Their only identity is the zero-based position
// they occupy in a track file.

use std::ops::Deref;

/// One IA frame as stored in, or recovered from, a track file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    data: Vec<u8>,
}

impl Frame {
    /// Wrap frame bytes
    pub fn new(data: Vec<u8>) -> Self {
        Frame { data }
    }

    /// Frame length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-length frame
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the frame bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Take ownership of the frame bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for Frame {
    fn from(data: Vec<u8>) -> Self {
        Frame::new(data)
    }
}

impl From<&[u8]> for Frame {
    fn from(data: &[u8]) -> Self {
        Frame::new(data.to_vec())
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Deref for Frame {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}
