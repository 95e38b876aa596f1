//! Defines the [`LinkRecord`], [`Collection`], and [`Error`] types, and the
//! logic for loading a link collection from a JSON file.
//!
//! The file must hold a JSON array. Loading only checks that much; each entry
//! is converted into a [`LinkRecord`] when [`Collection::records`] reaches
//! it, so a malformed entry fails the build at that entry rather than up
//! front.

use std::{
    fmt,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A single link in the collection.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LinkRecord {
    /// The link's address. May carry a query string; see
    /// [`crate::slug::canonical_url`].
    pub url: String,

    /// The display title.
    pub title: String,

    /// A short description shown as the page body.
    pub summary: String,

    /// A free-form display date. Empty when absent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,

    /// The link's tags, in display order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An ordered list of not-yet-validated collection entries.
#[derive(Debug)]
pub struct Collection {
    entries: Vec<Value>,
}

impl Collection {
    /// Reads and parses the JSON file at `path`. Fails if the file can't be
    /// opened, isn't valid JSON, or isn't a JSON array.
    pub fn load(path: &Path) -> Result<Collection> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        match serde_json::from_reader::<_, Value>(BufReader::new(file))
            .map_err(Error::from)
            .and_then(Collection::from_value)
        {
            Ok(collection) => Ok(collection),
            Err(e) => Err(Error::Annotated(
                format!("loading links from `{}`", path.display()),
                Box::new(e),
            )),
        }
    }

    /// Builds a collection from an already-parsed JSON value, which must be an
    /// array.
    pub fn from_value(value: Value) -> Result<Collection> {
        match value {
            Value::Array(entries) => Ok(Collection { entries }),
            _ => Err(Error::NotAnArray),
        }
    }

    /// The number of entries, valid or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts each entry into a [`LinkRecord`] in collection order. An entry
    /// that is missing a required field (or isn't an object) yields
    /// [`Error::Record`].
    pub fn records(&self) -> impl Iterator<Item = Result<LinkRecord>> + '_ {
        self.entries.iter().enumerate().map(|(index, entry)| {
            LinkRecord::deserialize(entry).map_err(|err| Error::Record { index, err })
        })
    }
}

impl std::str::FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Collection> {
        Collection::from_value(serde_json::from_str(s)?)
    }
}

/// Represents the result of loading links.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the link collection or one of its entries.
#[derive(Debug)]
pub enum Error {
    /// Returned when the input file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the input isn't valid JSON.
    Json(serde_json::Error),

    /// Returned when the input is valid JSON but not an array.
    NotAnArray,

    /// Returned when the entry at `index` can't be converted into a
    /// [`LinkRecord`].
    Record { index: usize, err: serde_json::Error },

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening links file '{}': {}", path.display(), err)
            }
            Error::Json(err) => err.fmt(f),
            Error::NotAnArray => write!(f, "expected a JSON array of links"),
            Error::Record { index, err } => write!(f, "link #{}: {}", index, err),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Json(err) => Some(err),
            Error::NotAnArray => None,
            Error::Record { index: _, err } => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    /// Converts a [`serde_json::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator when parsing the input.
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}
