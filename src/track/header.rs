// Header metadata: partition pack, identification set, soundfield descriptor
//
// Identification set items:
// - 0x3c01 CompanyName (UTF-16BE)
// - 0x3c02 ProductName (UTF-16BE)
// - 0x3c04 VersionString (UTF-16BE)
// - 0x3c05 ProductUID (16 bytes)
// - 0x3c06 ModificationDate (i64 milliseconds since the Unix epoch)
// - 0x3c0a AssetUID (16 bytes)
// - 0x3c0b LabelSet (u8)
//
// Soundfield descriptor items:
// - 0x3001 SampleRate (i32 numerator, i32 denominator)
// - 0x8101 RFC5646SpokenLanguage (ASCII)
// - 0x8102 ConformsToSpecifications (batch of 16-byte ULs)

use crate::identity::{ContainerIdentity, EditRate, LabelSet, SoundfieldDescriptor, Ul, WriterInfo};
use crate::klv::LocalSet;
use crate::utils::encoding::{decode_ascii, decode_utf16be, encode_utf16be};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

const TAG_COMPANY_NAME: u16 = 0x3c01;
const TAG_PRODUCT_NAME: u16 = 0x3c02;
const TAG_VERSION_STRING: u16 = 0x3c04;
const TAG_PRODUCT_UID: u16 = 0x3c05;
const TAG_MODIFICATION_DATE: u16 = 0x3c06;
const TAG_ASSET_UID: u16 = 0x3c0a;
const TAG_LABEL_SET: u16 = 0x3c0b;

const TAG_SAMPLE_RATE: u16 = 0x3001;
const TAG_SPOKEN_LANGUAGE: u16 = 0x8101;
const TAG_CONFORMS_TO: u16 = 0x8102;

pub const MAJOR_VERSION: u16 = 1;
pub const MINOR_VERSION: u16 = 3;

/// Header partition pack
///
/// Fixed size so the writer can rewrite it in place when finalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPack {
    pub major_version: u16,
    pub minor_version: u16,
    pub footer_offset: u64,
    pub frame_count: u32,
}

impl PartitionPack {
    pub const SIZE: usize = 16;

    /// Pack written before any frame
    pub fn open() -> Self {
        PartitionPack {
            major_version: MAJOR_VERSION,
            minor_version: MINOR_VERSION,
            footer_offset: 0,
            frame_count: 0,
        }
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..2].copy_from_slice(&self.major_version.to_be_bytes());
        out[2..4].copy_from_slice(&self.minor_version.to_be_bytes());
        out[4..12].copy_from_slice(&self.footer_offset.to_be_bytes());
        out[12..16].copy_from_slice(&self.frame_count.to_be_bytes());
        out
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let data: &[u8; Self::SIZE] = data.try_into().map_err(|_| {
            Error::invalid_track_file(format!(
                "header partition pack is {} bytes, expected {}",
                data.len(),
                Self::SIZE
            ))
        })?;

        let major_version = u16::from_be_bytes([data[0], data[1]]);
        if major_version != MAJOR_VERSION {
            return Err(Error::invalid_track_file(format!(
                "unsupported partition version {major_version}"
            )));
        }

        Ok(PartitionPack {
            major_version,
            minor_version: u16::from_be_bytes([data[2], data[3]]),
            footer_offset: u64::from_be_bytes(data[4..12].try_into().unwrap_or_default()),
            frame_count: u32::from_be_bytes(data[12..16].try_into().unwrap_or_default()),
        })
    }
}

/// Encode the identification set
pub fn encode_identification(info: &WriterInfo, modified: DateTime<Utc>) -> Result<Vec<u8>> {
    let mut set = LocalSet::new();
    set.push(TAG_COMPANY_NAME, encode_utf16be(&info.company_name))?;
    set.push(TAG_PRODUCT_NAME, encode_utf16be(&info.product_name))?;
    set.push(TAG_VERSION_STRING, encode_utf16be(&info.product_version))?;
    set.push(TAG_PRODUCT_UID, info.product_uuid.as_bytes().to_vec())?;
    set.push(
        TAG_MODIFICATION_DATE,
        modified.timestamp_millis().to_be_bytes().to_vec(),
    )?;
    set.push(TAG_ASSET_UID, info.asset_uuid.as_bytes().to_vec())?;
    set.push(TAG_LABEL_SET, vec![info.label_set.to_byte()])?;
    Ok(set.encode())
}

/// Decode the identification set
pub fn decode_identification(data: &[u8]) -> Result<(WriterInfo, Option<DateTime<Utc>>)> {
    let set = LocalSet::parse(data)?;

    let company_name = decode_utf16be(set.require(TAG_COMPANY_NAME, "CompanyName")?, "CompanyName")?;
    let product_name = decode_utf16be(set.require(TAG_PRODUCT_NAME, "ProductName")?, "ProductName")?;
    let product_version =
        decode_utf16be(set.require(TAG_VERSION_STRING, "VersionString")?, "VersionString")?;
    let product_uuid = Uuid::from_bytes(set.require_array(TAG_PRODUCT_UID, "ProductUID")?);
    let asset_uuid = Uuid::from_bytes(set.require_array(TAG_ASSET_UID, "AssetUID")?);

    let [label_byte] = set.require_array::<1>(TAG_LABEL_SET, "LabelSet")?;
    let label_set = LabelSet::from_byte(label_byte)
        .ok_or_else(|| Error::invalid_track_file(format!("unknown label set {label_byte}")))?;

    // Optional: older files may lack it
    let modified = match set.get(TAG_MODIFICATION_DATE) {
        Some(_) => {
            let millis = i64::from_be_bytes(set.require_array(TAG_MODIFICATION_DATE, "ModificationDate")?);
            DateTime::from_timestamp_millis(millis)
        }
        None => None,
    };

    let info = WriterInfo {
        product_uuid,
        company_name,
        product_name,
        product_version,
        asset_uuid,
        label_set,
    };
    Ok((info, modified))
}

/// Encode the soundfield descriptor set
pub fn encode_descriptor(identity: &ContainerIdentity) -> Result<Vec<u8>> {
    let mut rate = Vec::with_capacity(8);
    rate.extend_from_slice(&identity.edit_rate.numerator.to_be_bytes());
    rate.extend_from_slice(&identity.edit_rate.denominator.to_be_bytes());

    let labels: Vec<[u8; 16]> = identity.conformance_labels.iter().map(|ul| ul.0).collect();

    let mut set = LocalSet::new();
    set.push(TAG_SAMPLE_RATE, rate)?;
    set.push(
        TAG_SPOKEN_LANGUAGE,
        identity.descriptor.spoken_language.as_bytes().to_vec(),
    )?;
    set.push_batch(TAG_CONFORMS_TO, &labels)?;
    Ok(set.encode())
}

/// Decode the soundfield descriptor set
pub fn decode_descriptor(data: &[u8]) -> Result<(SoundfieldDescriptor, EditRate, Vec<Ul>)> {
    let set = LocalSet::parse(data)?;

    let rate: [u8; 8] = set.require_array(TAG_SAMPLE_RATE, "SampleRate")?;
    let edit_rate = EditRate {
        numerator: i32::from_be_bytes([rate[0], rate[1], rate[2], rate[3]]),
        denominator: i32::from_be_bytes([rate[4], rate[5], rate[6], rate[7]]),
    };

    let spoken_language = decode_ascii(
        set.require(TAG_SPOKEN_LANGUAGE, "RFC5646SpokenLanguage")?,
        "RFC5646SpokenLanguage",
    )?;

    let labels = set
        .require_batch::<16>(TAG_CONFORMS_TO, "ConformsToSpecifications")?
        .into_iter()
        .map(Ul)
        .collect();

    Ok((SoundfieldDescriptor { spoken_language }, edit_rate, labels))
}
