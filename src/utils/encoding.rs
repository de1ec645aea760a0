// String encodings used in header metadata
//
// Identification strings are UTF-16BE without BOM or terminator.
// Language tags are plain ASCII.

use crate::{Error, Result};
use encoding_rs::UTF_16BE;

/// Encode text as UTF-16BE
pub fn encode_utf16be(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|unit| unit.to_be_bytes()).collect()
}

/// Decode UTF-16BE text, rejecting odd lengths and unpaired surrogates
pub fn decode_utf16be(data: &[u8], field: &str) -> Result<String> {
    UTF_16BE
        .decode_without_bom_handling_and_without_replacement(data)
        .map(|text| text.into_owned())
        .ok_or_else(|| Error::invalid_track_file(format!("{field} is not valid UTF-16BE")))
}

/// Decode an ASCII string
pub fn decode_ascii(data: &[u8], field: &str) -> Result<String> {
    if !data.is_ascii() {
        return Err(Error::invalid_track_file(format!("{field} is not ASCII")));
    }
    // ASCII is valid UTF-8
    Ok(String::from_utf8_lossy(data).into_owned())
}
