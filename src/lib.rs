//! The library code for `linkpages`, which turns a curated collection of
//! links into one static HTML page per link. A build is a straight line:
//!
//! 1. Loading the collection from a JSON file ([`crate::link`])
//! 2. Deriving each link's slug from its canonical URL ([`crate::slug`])
//! 3. Rendering each link's page ([`crate::render`], styled by
//!    [`crate::theme`])
//! 4. Writing the pages and the slug index to disk ([`crate::write`])
//!
//! The slug index maps each canonical URL (the URL without its query string)
//! to its slug, so other parts of the site can link to a page knowing only
//! the link's URL. [`crate::build::build`] runs all of the steps for a
//! [`crate::config::Config`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod link;
pub mod render;
pub mod slug;
pub mod theme;
pub mod write;
