//! Metadata Extractor
//!
//! Reshapes a PNG's text metadata (keyword → text) into EXIF ASCII tags.
//!
//! - `prompt` always lands on [`PROMPT_TAG`] as `Prompt:<json>`.
//! - Every other key takes the next tag counting down from
//!   [`EXTRA_METADATA_TAG`]; `workflow` is stored as `Workflow:<json>`, any
//!   other key as `<key>:<json>`.
//!
//! Values are parsed as JSON and re-serialized canonically; a value that is
//! not JSON fails the whole file.

use crate::canonical_json::canonicalize;
use shared_utils::common_utils::truncate_preview;
use shared_utils::{ConvertError, Result};
use std::io::Cursor;

/// IFD0 slot for the generation prompt (TIFF `Model`).
pub const PROMPT_TAG: u16 = 0x0110;
/// First slot for every other key (TIFF `Make`), decremented per key.
pub const EXTRA_METADATA_TAG: u16 = 0x010f;

/// Characters of each value shown in the per-file log.
pub const PREVIEW_CHARS: usize = 60;

/// Order in which non-prompt keys receive their tag ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TagOrder {
    /// Order the keys appear in the source file.
    #[default]
    Source,
    /// Lexicographic key order.
    Sorted,
}

/// Tag id → string value, unique ids, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataMap {
    entries: Vec<(u16, String)>,
}

impl MetadataMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, refusing ids that are already taken.
    pub fn insert(&mut self, tag: u16, value: String) -> Result<()> {
        if self.get(tag).is_some() {
            return Err(ConvertError::MetadataLayout(format!(
                "tag 0x{:04x} assigned twice",
                tag
            )));
        }
        self.entries.push((tag, value));
        Ok(())
    }

    pub fn get(&self, tag: u16) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> {
        self.entries.iter().map(|(t, v)| (*t, v.as_str()))
    }

    /// `(tag, truncated value)` pairs for logging.
    pub fn preview_lines(&self) -> Vec<(u16, String)> {
        self.iter()
            .map(|(tag, value)| (tag, truncate_preview(value, PREVIEW_CHARS)))
            .collect()
    }

    /// Serialize as a little-endian TIFF structure holding one IFD0 of ASCII
    /// entries, the payload of a WebP `EXIF` chunk.
    pub fn to_exif_bytes(&self) -> Result<Vec<u8>> {
        let fields: Vec<exif::Field> = self
            .entries
            .iter()
            .map(|(tag, value)| exif::Field {
                tag: exif::Tag(exif::Context::Tiff, *tag),
                ifd_num: exif::In::PRIMARY,
                value: exif::Value::Ascii(vec![value.as_bytes().to_vec()]),
            })
            .collect();

        let mut writer = exif::experimental::Writer::new();
        for field in &fields {
            writer.push_field(field);
        }

        let mut buf = Cursor::new(Vec::new());
        writer
            .write(&mut buf, true)
            .map_err(|e| ConvertError::MetadataLayout(format!("EXIF encoding failed: {}", e)))?;
        Ok(buf.into_inner())
    }
}

/// Collapse repeated keys the way a mapping would: first position, last value.
fn dedupe_entries(entries: &[(String, String)]) -> Vec<(&str, &str)> {
    let mut out: Vec<(&str, &str)> = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        match out.iter_mut().find(|(k, _)| *k == key.as_str()) {
            Some(slot) => slot.1 = value.as_str(),
            None => out.push((key.as_str(), value.as_str())),
        }
    }
    out
}

/// Build the EXIF tag map from text metadata entries.
pub fn build_metadata_map(entries: &[(String, String)], order: TagOrder) -> Result<MetadataMap> {
    let mut ordered = dedupe_entries(entries);
    if order == TagOrder::Sorted {
        ordered.sort_by(|a, b| a.0.cmp(b.0));
    }

    let mut map = MetadataMap::new();
    let mut next_extra = Some(EXTRA_METADATA_TAG);

    for (key, raw) in ordered {
        let json = canonicalize(raw).map_err(|source| ConvertError::MetadataParse {
            key: key.to_string(),
            source,
        })?;

        if key == "prompt" {
            map.insert(PROMPT_TAG, format!("Prompt:{}", json))?;
            continue;
        }

        let tag = next_extra.ok_or_else(|| {
            ConvertError::MetadataLayout(format!(
                "tag space exhausted before key '{}'",
                key
            ))
        })?;
        let value = if key == "workflow" {
            format!("Workflow:{}", json)
        } else {
            format!("{}:{}", key, json)
        };
        map.insert(tag, value)?;
        next_extra = tag.checked_sub(1);
    }

    Ok(map)
}
