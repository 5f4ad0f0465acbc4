//! Parameter snapshot taken from a page URL.
//!
//! Parsing follows `application/x-www-form-urlencoded` rules through the
//! `url` crate, which is what `URLSearchParams` does in a browser.

use url::{Position, Url};

use crate::config::CodeUnit;
use crate::error::ParamsResult;

/// Ordered query pairs. Duplicate keys are kept as separate entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterList {
    params: Vec<(String, String)>,
}

impl ParameterList {
    /// Parse from query string (with or without leading "?").
    pub fn parse(query: &str) -> Self {
        Self::parse_with(query, false)
    }

    /// Parse, optionally treating `;` as a pair separator as well.
    pub fn parse_with(query: &str, semicolon_separator: bool) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let query = if semicolon_separator {
            query.replace(';', "&")
        } else {
            query.to_string()
        };
        let params = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { params }
    }

    /// Parse the query of a full URL. A URL without a query gives an empty list.
    pub fn from_url(url: &str) -> ParamsResult<Self> {
        let url = Url::parse(url)?;
        Ok(Self::parse(url.query().unwrap_or("")))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Entry at position `i`.
    pub fn get(&self, i: usize) -> Option<(&str, &str)> {
        self.params.get(i).map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn key(&self, i: usize) -> Option<&str> {
        self.params.get(i).map(|(k, _)| k.as_str())
    }

    pub fn value(&self, i: usize) -> Option<&str> {
        self.params.get(i).map(|(_, v)| v.as_str())
    }

    /// Get the first value for a key.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get all values for a key, in order.
    pub fn all(&self, key: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Get all entries as pairs.
    pub fn entries(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Where the snapshot was taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLocation {
    href: String,
    path: String,
    query: String,
    hash: String,
}

impl PageLocation {
    /// Parse a full URL.
    pub fn parse(url: &str) -> ParamsResult<Self> {
        let url = Url::parse(url)?;
        Ok(Self::from_url(&url))
    }

    fn from_url(url: &Url) -> Self {
        Self {
            href: url.to_string(),
            // Everything up to and including the path
            path: url[..Position::AfterPath].to_string(),
            query: url.query().unwrap_or("").to_string(),
            hash: url.fragment().unwrap_or("").to_string(),
        }
    }

    /// URL before the query and hash, or the whole URL with `full`.
    pub fn path(&self, full: bool) -> &str {
        if full { &self.href } else { &self.path }
    }

    /// Raw query without the leading "?".
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Text after "#", empty if there is none.
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

/// One pair, pre-encoded into the configured code unit.
#[derive(Debug, Clone)]
pub(crate) struct EncodedPair {
    pub(crate) key: Vec<u32>,
    pub(crate) value: Vec<u32>,
}

/// Path, full URL and hash, pre-encoded. All empty without a location.
#[derive(Debug, Clone, Default)]
pub(crate) struct EncodedLocation {
    pub(crate) path: Vec<u32>,
    pub(crate) href: Vec<u32>,
    pub(crate) hash: Vec<u32>,
}

impl EncodedLocation {
    pub(crate) fn path(&self, full: bool) -> &[u32] {
        if full { &self.href } else { &self.path }
    }
}

/// Immutable snapshot held by a context. Keeps the parsed pairs together
/// with their encoded units so character queries index directly.
#[derive(Debug, Clone)]
pub struct Snapshot {
    params: ParameterList,
    location: Option<PageLocation>,
    encoded: Vec<EncodedPair>,
    encoded_location: EncodedLocation,
}

impl Snapshot {
    pub fn new(params: ParameterList, location: Option<PageLocation>, code_unit: CodeUnit) -> Self {
        let encoded = params
            .iter()
            .map(|(k, v)| EncodedPair {
                key: code_unit.encode(k),
                value: code_unit.encode(v),
            })
            .collect();
        let encoded_location = location
            .as_ref()
            .map(|loc| EncodedLocation {
                path: code_unit.encode(loc.path(false)),
                href: code_unit.encode(loc.path(true)),
                hash: code_unit.encode(loc.hash()),
            })
            .unwrap_or_default();
        Self {
            params,
            location,
            encoded,
            encoded_location,
        }
    }

    /// An empty snapshot, what queries see before initialization.
    pub fn empty(code_unit: CodeUnit) -> Self {
        Self::new(ParameterList::default(), None, code_unit)
    }

    pub fn params(&self) -> &ParameterList {
        &self.params
    }

    pub fn location(&self) -> Option<&PageLocation> {
        self.location.as_ref()
    }

    pub(crate) fn encoded(&self) -> &[EncodedPair] {
        &self.encoded
    }

    pub(crate) fn encoded_location(&self) -> &EncodedLocation {
        &self.encoded_location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let params = ParameterList::parse("?a=1&b=hello");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get(0), Some(("a", "1")));
        assert_eq!(params.get(1), Some(("b", "hello")));
        assert_eq!(params.get(2), None);
    }

    #[test]
    fn test_parse_empty_value() {
        let params = ParameterList::parse("?x=");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get(0), Some(("x", "")));
    }

    #[test]
    fn test_parse_key_without_equals() {
        let params = ParameterList::parse("begin&k=1");
        assert_eq!(params.get(0), Some(("begin", "")));
        assert_eq!(params.get(1), Some(("k", "1")));
    }

    #[test]
    fn test_parse_duplicates_kept() {
        let params = ParameterList::parse("?k=1&k=2");
        assert_eq!(params.len(), 2);
        assert_eq!(params.first("k"), Some("1"));
        assert_eq!(params.all("k"), vec!["1", "2"]);
    }

    #[test]
    fn test_parse_decoding() {
        let params = ParameterList::parse("cd=e+f&s=spa%20ce&u=%D0%BF%D1%80");
        assert_eq!(params.value(0), Some("e f"));
        assert_eq!(params.value(1), Some("spa ce"));
        assert_eq!(params.value(2), Some("пр"));
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        assert!(ParameterList::parse("").is_empty());
        assert!(ParameterList::parse("?").is_empty());
        assert_eq!(ParameterList::parse("a=1&&b=2&").len(), 2);
    }

    #[test]
    fn test_semicolon_separator() {
        assert_eq!(ParameterList::parse("a=1;b=2").len(), 1);

        let params = ParameterList::parse_with("a=1;b=2&c=%3B", true);
        assert_eq!(params.len(), 3);
        assert_eq!(params.get(1), Some(("b", "2")));
        assert_eq!(params.value(2), Some(";"));
    }

    #[test]
    fn test_from_url() {
        let params = ParameterList::from_url("https://example.com/app/?a&b=1#top").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.key(0), Some("a"));

        let none = ParameterList::from_url("https://example.com/").unwrap();
        assert!(none.is_empty());

        assert!(ParameterList::from_url("::").is_err());
    }

    #[test]
    fn test_location() {
        let loc = PageLocation::parse("https://example.com/app/index.html?a=1#myhash").unwrap();
        assert_eq!(loc.path(false), "https://example.com/app/index.html");
        assert_eq!(loc.path(true), "https://example.com/app/index.html?a=1#myhash");
        assert_eq!(loc.query(), "a=1");
        assert_eq!(loc.hash(), "myhash");

        let bare = PageLocation::parse("https://example.com").unwrap();
        assert_eq!(bare.hash(), "");
        assert_eq!(bare.query(), "");
    }

    #[test]
    fn test_snapshot_encodes_pairs() {
        let snapshot = Snapshot::new(ParameterList::parse("k=h%C3%A9"), None, CodeUnit::Utf16);
        assert_eq!(snapshot.encoded()[0].key, vec![u32::from(b'k')]);
        assert_eq!(snapshot.encoded()[0].value, vec![0x68, 0xE9]);
        assert!(Snapshot::empty(CodeUnit::Scalar).params().is_empty());
    }

    #[test]
    fn test_snapshot_encodes_location() {
        let location = PageLocation::parse("https://a.io/p?x=1#h%C3%A9").unwrap();
        let snapshot = Snapshot::new(ParameterList::parse(location.query()), Some(location), CodeUnit::Utf16);
        let encoded = snapshot.encoded_location();
        assert_eq!(CodeUnit::Utf16.decode(encoded.path(false)), "https://a.io/p");
        assert_eq!(CodeUnit::Utf16.decode(encoded.path(true)), "https://a.io/p?x=1#h%C3%A9");
        assert_eq!(CodeUnit::Utf16.decode(&encoded.hash), "h%C3%A9");

        let bare = Snapshot::empty(CodeUnit::Utf16);
        assert!(bare.encoded_location().path(true).is_empty());
        assert!(bare.encoded_location().hash.is_empty());
    }
}
