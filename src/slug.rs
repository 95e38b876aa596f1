//! Derives the short identifiers ("slugs") that name each link's page, and
//! defines the [`SlugIndex`] which maps canonical URLs to those identifiers.
//!
//! A link's canonical URL is its URL with the query string removed, so two
//! links that differ only in their query parameters share an identifier.

use indexmap::IndexMap;
use md5::Md5;
use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};
use sha2::{Digest, Sha256};
use std::io;

/// The number of hexadecimal characters kept from the digest.
pub const SLUG_LENGTH: usize = 10;

/// The hash function used to derive identifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// MD5. This is the default because previously published identifiers
    /// were derived with it.
    #[default]
    Md5,

    /// SHA-256.
    Sha256,
}

/// Returns the canonical form of `url`: everything before the first `?`.
pub fn canonical_url(url: &str) -> &str {
    match url.find('?') {
        Some(i) => &url[..i],
        None => url,
    }
}

/// Derives the identifier for `url` with the default [`Algorithm`].
pub fn derive(url: &str) -> String {
    derive_with(url, Algorithm::default())
}

/// Derives the identifier for `url`: the first [`SLUG_LENGTH`] lowercase hex
/// characters of the digest of its canonical form.
pub fn derive_with(url: &str, algorithm: Algorithm) -> String {
    let canonical = canonical_url(url).as_bytes();
    let mut slug = match algorithm {
        Algorithm::Md5 => hex::encode(Md5::digest(canonical)),
        Algorithm::Sha256 => hex::encode(Sha256::digest(canonical)),
    };
    slug.truncate(SLUG_LENGTH);
    slug
}

/// Maps canonical URLs to identifiers. Keys keep the order in which they
/// were first inserted; inserting an existing key replaces its value in
/// place.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct SlugIndex(IndexMap<String, String>);

impl SlugIndex {
    pub fn new() -> SlugIndex {
        SlugIndex::default()
    }

    /// Records `slug` for `canonical`.
    pub fn insert(&mut self, canonical: &str, slug: String) {
        self.0.insert(canonical.to_owned(), slug);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serializes the index as a JSON object indented with two spaces. All
    /// non-ASCII characters are written as `\uXXXX` escapes.
    pub fn to_json_pretty(&self) -> serde_json::Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut out, AsciiFormatter::default());
        self.serialize(&mut serializer)?;
        Ok(out)
    }
}

/// A [`PrettyFormatter`] that escapes everything outside printable ASCII,
/// using UTF-16 surrogate pairs above the Basic Multilingual Plane.
#[derive(Default)]
struct AsciiFormatter(PrettyFormatter<'static>);

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut rest = fragment;
        while let Some(i) = rest.find(|c: char| !(' '..='~').contains(&c)) {
            writer.write_all(rest[..i].as_bytes())?;
            let mut chars = rest[i..].chars();
            if let Some(c) = chars.next() {
                let mut units = [0; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
            rest = chars.as_str();
        }
        writer.write_all(rest.as_bytes())
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }
}
