//! Scanning field extractor for descriptors that are not well-formed JSON.
//!
//! Fields are located by searching for `"key":` directly in the text. Known
//! limitations: the band list ends at the first `]` after it starts, and each
//! band object ends at its first `}`, so nested arrays or objects inside the
//! band list are not supported.

use super::{BandEntry, DescriptorSource};

/// Descriptor text searched field by field
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    text: &'a str,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Byte position just past the first `"key":`
    fn value_start(&self, key: &str) -> Option<usize> {
        let needle = format!("\"{}\":", key);
        self.text.find(&needle).map(|pos| pos + needle.len())
    }

    /// Raw scalar text for `key`, quoted or bare
    pub fn scalar(&self, key: &str) -> Option<&'a str> {
        let text = self.text;
        let start = skip_whitespace(text, self.value_start(key)?, &[' ', '\t']);
        let rest = &text[start..];

        if let Some(quoted) = rest.strip_prefix('"') {
            return raw_quoted(quoted);
        }

        let end = rest.find(&[',', '}', ']'][..]).unwrap_or(rest.len());
        Some(rest[..end].trim_end_matches(&[' ', '\t'][..]))
    }

    /// Balanced `{...}` object text for `key`, braces included
    pub fn object_text(&self, key: &str) -> Option<&'a str> {
        let text = self.text;
        let start = skip_whitespace(text, self.value_start(key)?, &[' ', '\t', '\n', '\r']);
        if !text[start..].starts_with('{') {
            return None;
        }

        let mut depth = 0usize;
        for (i, c) in text[start..].char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..start + i + 1]);
                    }
                }
                _ => {}
            }
        }
        Some(&text[start..])
    }

    /// Object texts inside the `"bands":[ ... ]` span
    pub fn band_objects(&self) -> Vec<&'a str> {
        let text = self.text;
        let mut objects = Vec::new();

        let Some(key_pos) = text.find("\"bands\":") else {
            return objects;
        };
        let Some(open) = text[key_pos..].find('[').map(|p| key_pos + p) else {
            return objects;
        };
        let Some(close) = text[open..].find(']').map(|p| open + p) else {
            return objects;
        };

        let mut rest = &text[open + 1..close];
        while let Some(obj_start) = rest.find('{') {
            let Some(obj_end) = rest[obj_start..].find('}').map(|p| obj_start + p) else {
                break;
            };
            objects.push(&rest[obj_start..=obj_end]);
            rest = &rest[obj_end + 1..];
        }
        objects
    }
}

/// Text up to the first unescaped `"`, escapes left as written
fn raw_quoted(quoted: &str) -> Option<&str> {
    let mut escaped = false;
    for (i, c) in quoted.char_indices() {
        match c {
            '"' if !escaped => return Some(&quoted[..i]),
            '\\' => escaped = !escaped,
            _ => escaped = false,
        }
    }
    None
}

fn skip_whitespace(text: &str, mut pos: usize, whitespace: &[char]) -> usize {
    while let Some(c) = text[pos..].chars().next() {
        if !whitespace.contains(&c) {
            break;
        }
        pos += c.len_utf8();
    }
    pos
}

impl<'a> DescriptorSource for Scanner<'a> {
    fn string(&self, key: &str) -> Option<String> {
        self.scalar(key)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn object(&self, key: &str) -> Option<Self> {
        self.object_text(key).map(Scanner::new)
    }

    fn band_entries(&self) -> Vec<BandEntry> {
        self.band_objects()
            .into_iter()
            .map(|obj| {
                let band = Scanner::new(obj);
                BandEntry {
                    name: band.string("name"),
                    data_type: band.string("type"),
                    nodata: band.string("nodata"),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_quoted_and_bare() {
        let scanner = Scanner::new(r#"{"crs": "EPSG:4326","block_width":  512 ,"x":1}"#);
        assert_eq!(scanner.scalar("crs"), Some("EPSG:4326"));
        assert_eq!(scanner.scalar("block_width"), Some("512"));
        assert_eq!(scanner.scalar("missing"), None);
    }

    #[test]
    fn test_scalar_no_escape_decoding() {
        let scanner = Scanner::new(r#"{"name":"a\"b","path":"c:\\","next":"x"}"#);
        assert_eq!(scanner.scalar("name"), Some(r#"a\"b"#));
        assert_eq!(scanner.scalar("path"), Some(r"c:\\"));
        assert_eq!(scanner.scalar("next"), Some("x"));
    }

    #[test]
    fn test_scalar_unterminated_quote() {
        let scanner = Scanner::new(r#"{"crs":"EPSG"#);
        assert_eq!(scanner.scalar("crs"), None);
    }

    #[test]
    fn test_object_balanced() {
        let text = r#"{"tiling":{"a":{"b":1},"c":2},"d":3}"#;
        let scanner = Scanner::new(text);
        assert_eq!(scanner.object_text("tiling"), Some(r#"{"a":{"b":1},"c":2}"#));
        assert_eq!(scanner.object_text("d"), None);
    }

    #[test]
    fn test_object_scopes_lookup() {
        let text = r#"{"other":{"max_zoom":3},"tiling":{"max_zoom":9}}"#;
        let tiling = Scanner::new(text).object("tiling").unwrap();
        assert_eq!(tiling.string("max_zoom").as_deref(), Some("9"));
    }

    #[test]
    fn test_band_objects() {
        let text = r#"{"bands":[{"name":"r","type":"uint8"}, {"name":"g","type":"uint16"}]}"#;
        let bands = Scanner::new(text).band_entries();
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[1].name.as_deref(), Some("g"));
        assert_eq!(bands[1].data_type.as_deref(), Some("uint16"));
    }

    #[test]
    fn test_band_list_stops_at_first_bracket() {
        let text = r#"{"bands":[{"name":"a","type":"uint8","hist":[1,2]},{"name":"b","type":"int8"}]"#;
        let bands = Scanner::new(text).band_objects();
        // The span closes at the `]` of the nested array.
        assert_eq!(bands.len(), 0);
    }
}
