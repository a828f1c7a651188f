//! Field access over a well-formed JSON descriptor
//!
//! Values are kept as their raw JSON text. A quoted value reads as the
//! characters between its quotes with escapes left undecoded, the same as
//! the [`scan`](super::scan) path. Lookup is structural: a key is only
//! found at the level it is asked for, and when an object repeats a key
//! the last occurrence wins, whereas the scanning path takes the first
//! `"key":` anywhere in the text.

use std::collections::HashMap;

use serde_json::value::RawValue;

use super::{BandEntry, DescriptorSource};

/// A parsed JSON object
#[derive(Debug, Clone)]
pub struct Document {
    fields: HashMap<String, Box<RawValue>>,
}

impl Document {
    /// Parses `text`, returning None unless it is a JSON object
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok().map(|fields| Self { fields })
    }
}

fn scalar_text(value: &RawValue) -> Option<String> {
    let raw = value.get().trim();
    if raw == "null" {
        return None;
    }
    let text = raw
        .strip_prefix('"')
        .and_then(|quoted| quoted.strip_suffix('"'))
        .unwrap_or(raw);
    Some(text.to_string()).filter(|t| !t.is_empty())
}

impl DescriptorSource for Document {
    fn string(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(|value| scalar_text(value))
    }

    fn object(&self, key: &str) -> Option<Self> {
        Document::parse(self.fields.get(key)?.get())
    }

    fn band_entries(&self) -> Vec<BandEntry> {
        let Some(bands) = self
            .fields
            .get("bands")
            .and_then(|raw| serde_json::from_str::<Vec<Box<RawValue>>>(raw.get()).ok())
        else {
            return Vec::new();
        };

        bands
            .iter()
            .filter_map(|band| Document::parse(band.get()))
            .map(|band| BandEntry {
                name: band.string("name"),
                data_type: band.string("type"),
                nodata: band.string("nodata"),
            })
            .collect()
    }
}
