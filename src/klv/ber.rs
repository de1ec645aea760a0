// BER length encoding
//
// Short form: one byte below 0x80.
// Long form: 0x80 | n, followed by n big-endian length bytes (n <= 8).
// The indefinite form (0x80 alone) is not used in track files.

use std::io::{self, Read};

/// Longest BER length field: marker byte plus 8 length bytes
pub const MAX_BER_LEN: usize = 9;

/// Encode a value length
pub fn encode_ber_length(len: u64) -> Vec<u8> {
    if len < 0x80 {
        return vec![len as u8];
    }

    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let significant = &bytes[skip..];

    let mut out = Vec::with_capacity(1 + significant.len());
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
    out
}

/// Decode a value length, returning it with the number of bytes consumed
pub fn read_ber_length<R: Read>(reader: &mut R) -> io::Result<(u64, usize)> {
    let mut first = [0u8; 1];
    reader.read_exact(&mut first)?;

    if first[0] < 0x80 {
        return Ok((first[0] as u64, 1));
    }

    let count = (first[0] & 0x7f) as usize;
    if count == 0 || count > 8 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported BER length marker 0x{:02x}", first[0]),
        ));
    }

    let mut buffer = [0u8; 8];
    reader.read_exact(&mut buffer[8 - count..])?;
    Ok((u64::from_be_bytes(buffer), 1 + count))
}
