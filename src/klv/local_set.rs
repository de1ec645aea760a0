// Local sets: header metadata as a sequence of 2-byte tag, 2-byte length items

use crate::utils::io::{read_be_u16, read_be_u32};
use crate::{Error, Result};
use std::io::Cursor;

/// Local set item tags with their raw values, in insertion order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LocalSet {
    items: Vec<(u16, Vec<u8>)>,
}

impl LocalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item
    pub fn push(&mut self, tag: u16, value: Vec<u8>) -> Result<()> {
        if value.len() > u16::MAX as usize {
            return Err(Error::invalid_identity(
                "local set item",
                format!("tag 0x{tag:04x} value of {} bytes exceeds 65535", value.len()),
            ));
        }
        self.items.push((tag, value));
        Ok(())
    }

    /// Append a batch: item count, item size, then the items back to back
    pub fn push_batch<const N: usize>(&mut self, tag: u16, items: &[[u8; N]]) -> Result<()> {
        let mut value = Vec::with_capacity(8 + items.len() * N);
        value.extend_from_slice(&(items.len() as u32).to_be_bytes());
        value.extend_from_slice(&(N as u32).to_be_bytes());
        for item in items {
            value.extend_from_slice(item);
        }
        self.push(tag, value)
    }

    /// Value of the first item with this tag
    pub fn get(&self, tag: u16) -> Option<&[u8]> {
        self.items
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_slice())
    }

    /// Value of a mandatory item
    pub fn require(&self, tag: u16, name: &str) -> Result<&[u8]> {
        self.get(tag)
            .ok_or_else(|| Error::invalid_track_file(format!("missing {name} (tag 0x{tag:04x})")))
    }

    /// Value of a mandatory fixed-size item
    pub fn require_array<const N: usize>(&self, tag: u16, name: &str) -> Result<[u8; N]> {
        let value = self.require(tag, name)?;
        value.try_into().map_err(|_| {
            Error::invalid_track_file(format!("{name} is {} bytes, expected {N}", value.len()))
        })
    }

    /// Items of a mandatory batch
    pub fn require_batch<const N: usize>(&self, tag: u16, name: &str) -> Result<Vec<[u8; N]>> {
        let value = self.require(tag, name)?;
        let mut cursor = Cursor::new(value);
        let malformed = || Error::invalid_track_file(format!("{name} batch is truncated"));

        let count = read_be_u32(&mut cursor).map_err(|_| malformed())? as usize;
        let size = read_be_u32(&mut cursor).map_err(|_| malformed())? as usize;
        if size != N {
            return Err(Error::invalid_track_file(format!(
                "{name} items are {size} bytes, expected {N}"
            )));
        }

        let body = &value[8..];
        if count.checked_mul(N) != Some(body.len()) {
            return Err(malformed());
        }

        Ok(body
            .chunks_exact(N)
            .map(|chunk| {
                let mut item = [0u8; N];
                item.copy_from_slice(chunk);
                item
            })
            .collect())
    }

    /// Serialize to a KLV value
    pub fn encode(&self) -> Vec<u8> {
        let size: usize = self.items.iter().map(|(_, v)| 4 + v.len()).sum();
        let mut out = Vec::with_capacity(size);
        for (tag, value) in &self.items {
            out.extend_from_slice(&tag.to_be_bytes());
            out.extend_from_slice(&(value.len() as u16).to_be_bytes());
            out.extend_from_slice(value);
        }
        out
    }

    /// Parse a KLV value
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let mut items = Vec::new();

        while (cursor.position() as usize) < data.len() {
            let truncated = || Error::invalid_track_file("local set item header is truncated");
            let tag = read_be_u16(&mut cursor).map_err(|_| truncated())?;
            let len = read_be_u16(&mut cursor).map_err(|_| truncated())? as usize;

            let start = cursor.position() as usize;
            let end = start + len;
            if end > data.len() {
                return Err(Error::invalid_track_file(format!(
                    "local set item 0x{tag:04x} overruns the set"
                )));
            }
            items.push((tag, data[start..end].to_vec()));
            cursor.set_position(end as u64);
        }

        Ok(LocalSet { items })
    }
}
