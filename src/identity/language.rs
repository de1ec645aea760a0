// RFC 5646 spoken language tags and asset identifiers
//
// Only the tag syntax is checked (subtags of 1 to 8 ASCII alphanumerics, a
// 2 to 8 letter primary language or a private-use/grandfathered singleton).
// Registry lookup is out of scope.

use crate::{Error, Result};
use uuid::Uuid;

/// Default spoken language of the soundfield descriptor
pub const DEFAULT_LANGUAGE: &str = "en";

/// Check the syntax of an RFC 5646 language tag
pub fn validate_language_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(Error::InvalidLanguageTag("empty tag".to_string()));
    }

    let mut subtags = tag.split('-');
    let primary = subtags.next().unwrap_or_default();
    let primary_ok = match primary.len() {
        1 => matches!(primary, "x" | "X" | "i" | "I"),
        2..=8 => primary.chars().all(|c| c.is_ascii_alphabetic()),
        _ => false,
    };
    if !primary_ok {
        return Err(Error::InvalidLanguageTag(format!(
            "{tag}: bad primary subtag '{primary}'"
        )));
    }

    for subtag in subtags {
        if subtag.is_empty()
            || subtag.len() > 8
            || !subtag.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(Error::InvalidLanguageTag(format!(
                "{tag}: bad subtag '{subtag}'"
            )));
        }
    }

    Ok(())
}

/// clap value parser for `--lang`
pub fn parse_language_tag(s: &str) -> Result<String> {
    validate_language_tag(s)?;
    Ok(s.to_string())
}

/// Parse an asset id given as 32 hex digits (hyphenated form also accepted)
pub fn parse_asset_id(s: &str) -> Result<Uuid> {
    Uuid::try_parse(s.trim()).map_err(|e| Error::InvalidAssetId(format!("{s}: {e}")))
}
