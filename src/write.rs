use crate::link::{Error as LinkError, LinkRecord};
use crate::render::Renderer;
use crate::slug::{canonical_url, derive_with, Algorithm, SlugIndex};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// How to handle two different canonical URLs that derive the same slug.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Log a warning and let the later link overwrite the earlier page.
    #[default]
    Warn,

    /// Abort before writing the later link's page.
    Fail,
}

/// The outcome of a successful [`Writer::write_links`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    /// The number of pages written, counting overwrites.
    pub pages: usize,

    /// The number of distinct canonical URLs in the slug index.
    pub slugs: usize,
}

/// Responsible for rendering link pages and writing them, along with the
/// slug index, to disk.
pub struct Writer<'a> {
    /// Renders each [`LinkRecord`] into a page.
    pub renderer: Renderer<'a>,

    /// The directory in which page files are written. Each page is located at
    /// `{output_directory}/{slug}.{extension}`.
    pub output_directory: &'a Path,

    /// The file extension for page files, without the leading dot.
    pub extension: &'a str,

    /// The file to which the slug index is written.
    pub slug_index: &'a Path,

    /// The hash used to derive slugs.
    pub algorithm: Algorithm,

    pub collisions: CollisionPolicy,
}

impl Writer<'_> {
    /// Writes one page per record, then the slug index. A progress line is
    /// written to `progress` for each page, followed by a final count.
    ///
    /// Records are processed in order and the first error aborts the run.
    /// Pages written before the error stay on disk, and the slug index is
    /// only written once every record has succeeded.
    pub fn write_links<I, W>(&self, records: I, progress: &mut W) -> Result<Summary>
    where
        I: IntoIterator<Item = std::result::Result<LinkRecord, LinkError>>,
        W: io::Write,
    {
        create_dir(self.output_directory)?;

        let mut index = SlugIndex::new();
        let mut owners: HashMap<String, String> = HashMap::new();
        let mut pages = 0;
        for record in records {
            let record = record?;
            let canonical = canonical_url(&record.url);
            let slug = derive_with(&record.url, self.algorithm);
            self.check_collision(&mut owners, &slug, canonical)?;

            let file_name = format!("{}.{}", slug, self.extension);
            let path = self.output_directory.join(&file_name);
            write_file(&path, self.renderer.render(&record).as_bytes())?;
            tracing::debug!(path = %path.display(), url = %record.url, "wrote page");

            index.insert(canonical, slug);
            pages += 1;
            writeln!(progress, "  ✓ {} — {}", file_name, truncate(&record.title, 50))
                .map_err(Error::Progress)?;
        }

        if let Some(parent) = self.slug_index.parent() {
            create_dir(parent)?;
        }
        let json = index.to_json_pretty().map_err(Error::SerializeSlugs)?;
        write_file(self.slug_index, &json)?;

        let index_name = self
            .slug_index
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        writeln!(progress, "\nGenerated {} pages + {}", pages, index_name)
            .map_err(Error::Progress)?;

        Ok(Summary {
            pages,
            slugs: index.len(),
        })
    }

    // Records `canonical` as the owner of `slug`, applying the collision
    // policy if a different canonical URL already owns it.
    fn check_collision(
        &self,
        owners: &mut HashMap<String, String>,
        slug: &str,
        canonical: &str,
    ) -> Result<()> {
        match owners.get(slug) {
            Some(first) if first != canonical => match self.collisions {
                CollisionPolicy::Warn => {
                    tracing::warn!(
                        slug,
                        first = %first,
                        second = canonical,
                        "slug collision; the later page overwrites the earlier one"
                    );
                }
                CollisionPolicy::Fail => {
                    return Err(Error::Collision {
                        slug: slug.to_owned(),
                        first: first.clone(),
                        second: canonical.to_owned(),
                    });
                }
            },
            Some(_) => {}
            None => {
                owners.insert(slug.to_owned(), canonical.to_owned());
            }
        }
        Ok(())
    }
}

/// Returns at most the first `max` characters of `s`.
fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| Error::CreateDirectory {
        path: dir.to_owned(),
        err,
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents).map_err(|err| Error::WriteFile {
        path: path.to_owned(),
        err,
    })
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// A link record couldn't be read.
    Link(LinkError),

    /// An output directory couldn't be created.
    CreateDirectory { path: PathBuf, err: io::Error },

    /// An output file couldn't be written.
    WriteFile { path: PathBuf, err: io::Error },

    /// The slug index couldn't be serialized.
    SerializeSlugs(serde_json::Error),

    /// Two different canonical URLs derived the same slug.
    Collision {
        slug: String,
        first: String,
        second: String,
    },

    /// A progress line couldn't be written.
    Progress(io::Error),
}

impl From<LinkError> for Error {
    /// Converts a [`LinkError`] into an [`Error`]. This allows us to use the
    /// `?` operator on each record.
    fn from(err: LinkError) -> Error {
        Error::Link(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Link(err) => err.fmt(f),
            Error::CreateDirectory { path, err } => {
                write!(f, "Creating directory '{}': {}", path.display(), err)
            }
            Error::WriteFile { path, err } => {
                write!(f, "Writing file '{}': {}", path.display(), err)
            }
            Error::SerializeSlugs(err) => write!(f, "Serializing slug index: {}", err),
            Error::Collision {
                slug,
                first,
                second,
            } => write!(
                f,
                "'{}' and '{}' both derive the slug '{}'",
                first, second, slug
            ),
            Error::Progress(err) => write!(f, "Reporting progress: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Link(err) => Some(err),
            Error::CreateDirectory { path: _, err } => Some(err),
            Error::WriteFile { path: _, err } => Some(err),
            Error::SerializeSlugs(err) => Some(err),
            Error::Collision { .. } => None,
            Error::Progress(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::link::Collection;
    use crate::slug::derive;
    use crate::theme::Theme;
    use std::fs;

    fn writer<'a>(theme: &'a Theme, out: &'a Path, slugs: &'a Path) -> Writer<'a> {
        Writer {
            renderer: Renderer::new(theme, "../index.html"),
            output_directory: out,
            extension: "html",
            slug_index: slugs,
            algorithm: Algorithm::Md5,
            collisions: CollisionPolicy::Warn,
        }
    }

    fn page_count(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_write_single_link() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("pages");
        let slugs = dir.path().join("data").join("slugs.json");
        let theme = Theme::default();
        let links: Collection = r#"[{"url":"https://example.com/a?x=1","title":"T1","summary":"S1","tags":["ai","tools"]}]"#
            .parse()?;

        let mut progress = Vec::new();
        let summary = writer(&theme, &out, &slugs).write_links(links.records(), &mut progress)?;
        assert_eq!(summary, Summary { pages: 1, slugs: 1 });

        let slug = derive("https://example.com/a");
        let page = fs::read_to_string(out.join(format!("{}.html", slug))).unwrap();
        assert!(page.contains("<h1>T1</h1>"));
        assert!(page.contains("S1"));
        assert!(page.contains("tag=ai"));
        assert!(page.contains("tag=tools"));
        assert_eq!(page_count(&out), 1);

        assert_eq!(
            fs::read_to_string(&slugs).unwrap(),
            format!("{{\n  \"https://example.com/a\": \"{}\"\n}}", slug)
        );
        assert_eq!(
            String::from_utf8(progress).unwrap(),
            format!("  ✓ {}.html — T1\n\nGenerated 1 pages + slugs.json\n", slug)
        );
        Ok(())
    }

    #[test]
    fn test_slug_index_is_ascii() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("pages");
        let slugs = dir.path().join("slugs.json");
        let theme = Theme::default();
        let links: Collection =
            r#"[{"url":"https://example.com/café?x=1","title":"Café","summary":"S"}]"#.parse()?;

        writer(&theme, &out, &slugs).write_links(links.records(), &mut io::sink())?;
        assert_eq!(
            fs::read_to_string(&slugs).unwrap(),
            format!(
                "{{\n  \"https://example.com/caf\\u00e9\": \"{}\"\n}}",
                derive("https://example.com/café")
            )
        );
        Ok(())
    }

    #[test]
    fn test_missing_summary_aborts_before_slug_index() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("pages");
        let slugs = dir.path().join("slugs.json");
        let theme = Theme::default();
        let links: Collection = r#"[
            {"url":"https://example.com/a","title":"T1","summary":"S1"},
            {"url":"https://example.com/b","title":"T2"}
        ]"#
        .parse()?;

        let result = writer(&theme, &out, &slugs).write_links(links.records(), &mut io::sink());
        assert!(matches!(result, Err(Error::Link(LinkError::Record { index: 1, .. }))));
        assert!(!slugs.exists());
        assert!(out.join(format!("{}.html", derive("https://example.com/a"))).exists());
        assert!(!out.join(format!("{}.html", derive("https://example.com/b"))).exists());
        Ok(())
    }

    #[test]
    fn test_query_variants_share_a_page() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("pages");
        let slugs = dir.path().join("slugs.json");
        let theme = Theme::default();
        let links: Collection = r#"[
            {"url":"https://example.com/a?x=1","title":"First","summary":"S"},
            {"url":"https://example.com/a?x=2","title":"Second","summary":"S"}
        ]"#
        .parse()?;

        let summary = writer(&theme, &out, &slugs).write_links(links.records(), &mut io::sink())?;
        assert_eq!(summary, Summary { pages: 2, slugs: 1 });
        assert_eq!(page_count(&out), 1);

        let page = fs::read_to_string(out.join(format!("{}.html", derive("https://example.com/a")))).unwrap();
        assert!(page.contains("<h1>Second</h1>"));
        assert!(!page.contains("First"));
        Ok(())
    }

    #[test]
    fn test_rerun_is_byte_identical() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("pages");
        let slugs = dir.path().join("slugs.json");
        let theme = Theme::default();
        let links: Collection = r#"[
            {"url":"https://example.com/a","title":"A","summary":"S","tags":["x"]},
            {"url":"https://example.com/b","title":"B","summary":"S","date":"2024"}
        ]"#
        .parse()?;
        let writer = writer(&theme, &out, &slugs);

        writer.write_links(links.records(), &mut io::sink())?;
        let first_page = fs::read(out.join(format!("{}.html", derive("https://example.com/b")))).unwrap();
        let first_index = fs::read(&slugs).unwrap();

        writer.write_links(links.records(), &mut io::sink())?;
        let second_page = fs::read(out.join(format!("{}.html", derive("https://example.com/b")))).unwrap();
        assert_eq!(first_page, second_page);
        assert_eq!(first_index, fs::read(&slugs).unwrap());
        assert_eq!(page_count(&out), 2);
        Ok(())
    }

    #[test]
    fn test_collision_policy() {
        let theme = Theme::default();
        let dir = tempfile::tempdir().unwrap();
        let mut writer = writer(&theme, dir.path(), dir.path());
        let mut owners = HashMap::new();

        assert!(writer.check_collision(&mut owners, "abc", "https://example.com/a").is_ok());
        assert!(writer.check_collision(&mut owners, "abc", "https://example.com/a").is_ok());
        assert!(writer.check_collision(&mut owners, "abc", "https://example.com/b").is_ok());

        writer.collisions = CollisionPolicy::Fail;
        match writer.check_collision(&mut owners, "abc", "https://example.com/b") {
            Err(Error::Collision { slug, first, second }) => {
                assert_eq!(slug, "abc");
                assert_eq!(first, "https://example.com/a");
                assert_eq!(second, "https://example.com/b");
            }
            other => panic!("wanted a collision error; found {:?}", other),
        }
        assert!(writer.check_collision(&mut owners, "abc", "https://example.com/a").is_ok());
    }

    #[test]
    fn test_unwritable_output_directory() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("pages");
        fs::write(&blocker, b"not a directory").unwrap();
        let slugs = dir.path().join("slugs.json");
        let theme = Theme::default();
        let links: Collection = "[]".parse()?;

        let result = writer(&theme, &blocker, &slugs).write_links(links.records(), &mut io::sink());
        assert!(matches!(result, Err(Error::CreateDirectory { .. })));
        assert!(!slugs.exists());
        Ok(())
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 50), "short");
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ééééé", 2), "éé");
        assert_eq!(truncate(&"x".repeat(60), 50).len(), 50);
    }
}
