//! Exports the [`build`] function which stitches together the high-level
//! steps of a build: loading the link collection ([`crate::link`]) and
//! rendering and writing each page plus the slug index ([`crate::write`]).

use crate::config::Config;
use crate::link::{Collection, Error as LinkError};
use crate::render::Renderer;
use crate::write::{Error as WriteError, Summary, Writer};
use std::fmt;
use std::io::Write;

/// Builds every link page described by a [`Config`], writing progress lines
/// to `progress`. The whole input is loaded before anything is written, so an
/// unreadable or malformed links file leaves the output untouched.
pub fn build<W: Write>(config: &Config, progress: &mut W) -> Result<Summary> {
    let links = Collection::load(&config.input)?;
    tracing::debug!(
        links = links.len(),
        input = %config.input.display(),
        "loaded link collection"
    );

    let writer = Writer {
        renderer: Renderer::new(&config.theme, &config.index_href),
        output_directory: &config.output_directory,
        extension: &config.extension,
        slug_index: &config.slug_index,
        algorithm: config.digest,
        collisions: config.collisions,
    };
    Ok(writer.write_links(links.records(), progress)?)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for a build. Errors can occur while loading the links file
/// or while writing pages.
#[derive(Debug)]
pub enum Error {
    /// Returned when the links file can't be loaded.
    Load(LinkError),

    /// Returned for errors rendering or writing pages.
    Write(WriteError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Load(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Load(err) => Some(err),
            Error::Write(err) => Some(err),
        }
    }
}

impl From<LinkError> for Error {
    /// Converts [`LinkError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: LinkError) -> Error {
        Error::Load(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}
