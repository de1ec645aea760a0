// SMPTE universal labels (ULs)
//
// A UL is a 16-byte identifier. Track files use them both as KLV keys and as
// conformance labels asserting which interchange profile a file satisfies.
//
// Reference:
// - SMPTE ST 298: Universal Labels for Unique Identification of Digital Data
// - SMPTE ST 2067-201: IMF Immersive Audio Bitstream Level 0 Plug-in

use serde::{Serialize, Serializer};
use std::fmt;

/// 16-byte SMPTE universal label
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ul(pub [u8; 16]);

/// IMF IAB Track File Level 0 conformance label
pub const IMF_IAB_TRACK_FILE_LEVEL_0: Ul = Ul([
    0x06, 0x0e, 0x2b, 0x34, 0x04, 0x01, 0x01, 0x0d, 0x0d, 0x01, 0x07, 0x01, 0x19, 0x01, 0x00, 0x00,
]);

impl Ul {
    pub const LEN: usize = 16;

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

/// `urn:smpte:ul:060e2b34.0401010d.0d010701.19010000`
impl fmt::Display for Ul {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "urn:smpte:ul:")?;
        for (i, chunk) in self.0.chunks(4).enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            for byte in chunk {
                write!(f, "{byte:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Ul {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ul({self})")
    }
}

impl Serialize for Ul {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            IMF_IAB_TRACK_FILE_LEVEL_0.to_string(),
            "urn:smpte:ul:060e2b34.0401010d.0d010701.19010000"
        );
    }

    #[test]
    fn test_serialize_as_urn() {
        let json = serde_json::to_string(&IMF_IAB_TRACK_FILE_LEVEL_0).unwrap();
        assert_eq!(json, "\"urn:smpte:ul:060e2b34.0401010d.0d010701.19010000\"");
    }
}
