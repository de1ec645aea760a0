// Container identity: provenance and descriptive metadata of a track file
//
// Identity is written once, when the track file is created, and never
// changes afterwards. It is split the same way the header metadata is:
// - WriterInfo: who wrote the file and which asset it is (identification set)
// - SoundfieldDescriptor + edit rate + conformance labels (descriptor set)
//
// Defaults live in the Default impls below, not in module globals.

pub mod language;
pub mod rational;
pub mod ul;

pub use language::{parse_asset_id, parse_language_tag, validate_language_tag, DEFAULT_LANGUAGE};
pub use rational::EditRate;
pub use ul::{Ul, IMF_IAB_TRACK_FILE_LEVEL_0};

use crate::{Error, Result};
use serde::Serialize;
use uuid::Uuid;

/// Product UUID of this authoring tool
pub const DEFAULT_PRODUCT_UUID: Uuid = Uuid::from_bytes([
    0x92, 0x7f, 0xc4, 0xd1, 0x89, 0xa3, 0x4f, 0x88, 0x88, 0xbb, 0xd3, 0x63, 0xed, 0x33, 0x08, 0x4a,
]);
pub const DEFAULT_COMPANY_NAME: &str = "Sandflow Consulting LLC";
pub const DEFAULT_PRODUCT_NAME: &str = "iab-in-imf";
pub const DEFAULT_PRODUCT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Longest UTF-16 string a local set item can carry
const MAX_STRING_BYTES: usize = u16::MAX as usize;

/// Conformance label sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LabelSet {
    /// Legacy Interop labels, recognised when reading only
    MxfInterop,
    /// SMPTE labels
    #[default]
    MxfSmpte,
}

impl LabelSet {
    pub fn to_byte(self) -> u8 {
        match self {
            LabelSet::MxfInterop => 1,
            LabelSet::MxfSmpte => 2,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(LabelSet::MxfInterop),
            2 => Some(LabelSet::MxfSmpte),
            _ => None,
        }
    }
}

/// Authoring tool and asset identification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriterInfo {
    pub product_uuid: Uuid,
    pub company_name: String,
    pub product_name: String,
    pub product_version: String,
    pub asset_uuid: Uuid,
    pub label_set: LabelSet,
}

/// Tool defaults with a freshly generated random asset UUID
impl Default for WriterInfo {
    fn default() -> Self {
        WriterInfo {
            product_uuid: DEFAULT_PRODUCT_UUID,
            company_name: DEFAULT_COMPANY_NAME.to_string(),
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            product_version: DEFAULT_PRODUCT_VERSION.to_string(),
            asset_uuid: Uuid::new_v4(),
            label_set: LabelSet::default(),
        }
    }
}

/// IAB soundfield descriptor properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoundfieldDescriptor {
    /// RFC 5646 spoken language tag
    pub spoken_language: String,
}

impl Default for SoundfieldDescriptor {
    fn default() -> Self {
        SoundfieldDescriptor {
            spoken_language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Everything recorded about a track file at creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerIdentity {
    pub writer_info: WriterInfo,
    pub descriptor: SoundfieldDescriptor,
    pub edit_rate: EditRate,
    pub conformance_labels: Vec<Ul>,
}

impl Default for ContainerIdentity {
    fn default() -> Self {
        ContainerIdentity {
            writer_info: WriterInfo::default(),
            descriptor: SoundfieldDescriptor::default(),
            edit_rate: EditRate::default(),
            conformance_labels: vec![IMF_IAB_TRACK_FILE_LEVEL_0],
        }
    }
}

impl ContainerIdentity {
    /// Replace the random asset UUID
    pub fn with_asset_uuid(mut self, asset_uuid: Uuid) -> Self {
        self.writer_info.asset_uuid = asset_uuid;
        self
    }

    pub fn with_spoken_language(mut self, tag: impl Into<String>) -> Self {
        self.descriptor.spoken_language = tag.into();
        self
    }

    pub fn with_edit_rate(mut self, edit_rate: EditRate) -> Self {
        self.edit_rate = edit_rate;
        self
    }

    pub fn asset_uuid(&self) -> Uuid {
        self.writer_info.asset_uuid
    }

    /// Check that the identity can be written to a new track file
    pub fn validate(&self) -> Result<()> {
        self.edit_rate.validate()?;
        validate_language_tag(&self.descriptor.spoken_language)?;

        if self.writer_info.label_set != LabelSet::MxfSmpte {
            return Err(Error::invalid_identity(
                "label_set",
                "only SMPTE labels can be written",
            ));
        }

        let strings = [
            ("company_name", &self.writer_info.company_name),
            ("product_name", &self.writer_info.product_name),
            ("product_version", &self.writer_info.product_version),
        ];
        for (field, value) in strings {
            let bytes = value.encode_utf16().count() * 2;
            if bytes > MAX_STRING_BYTES {
                return Err(Error::invalid_identity(
                    field,
                    format!("{bytes} bytes of UTF-16 exceeds {MAX_STRING_BYTES}"),
                ));
            }
        }

        // Batch header (count + item size) plus 16 bytes per label
        let labels_bytes = 8 + self.conformance_labels.len() * Ul::LEN;
        if labels_bytes > MAX_STRING_BYTES {
            return Err(Error::invalid_identity(
                "conformance_labels",
                format!("{} labels do not fit", self.conformance_labels.len()),
            ));
        }

        Ok(())
    }
}
