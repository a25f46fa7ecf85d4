//! Parser for the `"name #tag #tag=value"` key mini-language

use std::collections::BTreeMap;

/// Tag name to tag value. An empty value still counts as present.
pub type Tags = BTreeMap<String, String>;

/// Split a raw key into its bare key and the tags that follow it.
///
/// Everything up to the first `#` is the key. Each `#` segment after it is a tag,
/// with an optional `=value`. Names, values and the key are trimmed; a repeated
/// tag keeps its last value and a segment with no name is dropped.
///
/// ```
/// let (key, tags) = tagdi::parse_key(" logger #shared #priority=2 ");
/// assert_eq!(key, "logger");
/// assert_eq!(tags["shared"], "");
/// assert_eq!(tags["priority"], "2");
/// ```
pub fn parse_key(raw: &str) -> (String, Tags) {
    let mut tags = Tags::new();

    let Some((key, rest)) = raw.split_once('#') else {
        return (raw.trim().to_string(), tags);
    };

    for segment in rest.split('#') {
        let (name, value) = match segment.split_once('=') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => (segment.trim(), ""),
        };

        if name.is_empty() {
            continue;
        }

        tags.insert(name.to_string(), value.to_string());
    }

    (key.trim().to_string(), tags)
}
