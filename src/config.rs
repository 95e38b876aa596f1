use crate::render::DEFAULT_INDEX_HREF;
use crate::slug::Algorithm;
use crate::theme::Theme;
use crate::write::CollisionPolicy;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "linkpages.yaml";

/// The contents of a project file. Paths are relative to the file's
/// directory.
#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct Project {
    input: Option<PathBuf>,
    output_directory: Option<PathBuf>,
    slug_index: Option<PathBuf>,
    extension: Option<String>,
    index_href: Option<String>,
    digest: Algorithm,
    collisions: CollisionPolicy,
    theme: Theme,
}

/// Everything a build needs, resolved to concrete paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The JSON file holding the link collection.
    pub input: PathBuf,

    /// The directory that receives one page per link.
    pub output_directory: PathBuf,

    /// The file that receives the canonical URL to slug mapping.
    pub slug_index: PathBuf,

    /// Page file extension, without the dot.
    pub extension: String,

    /// Link from each page back to the site index.
    pub index_href: String,

    pub digest: Algorithm,
    pub collisions: CollisionPolicy,
    pub theme: Theme,
}

impl Config {
    /// The default layout for a project rooted at `root`: links are read from
    /// `{root}/data/links.json`, pages are written to `{root}/pages`, and the
    /// slug index to `{root}/data/slugs.json`.
    pub fn with_root(root: &Path) -> Config {
        Config::from_project(root, Project::default())
    }

    /// Searches `dir` and then each of its ancestors for [`PROJECT_FILE`] and
    /// loads the first one found. If there is none, returns the defaults for
    /// `dir` (see [`Config::with_root`]). Fails if `dir` doesn't exist.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let absolute = dir
            .canonicalize()
            .with_context(|| format!("Resolving project directory `{}`", dir.display()))?;
        for ancestor in absolute.ancestors() {
            let path = ancestor.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path)
                    .with_context(|| format!("Loading configuration `{}`", path.display()));
            }
        }
        tracing::debug!(root = %dir.display(), "no {} found; using defaults", PROJECT_FILE);
        Ok(Config::with_root(dir))
    }

    /// Loads the project file at `path`. The file's directory is the project
    /// root.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path)
            .map_err(|e| anyhow!("Opening project file `{}`: {}", path.display(), e))?;
        let project: Project = serde_yaml::from_reader(file)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => {
                let config = Config::from_project(project_root, project);
                tracing::debug!(
                    input = %config.input.display(),
                    output_directory = %config.output_directory.display(),
                    slug_index = %config.slug_index.display(),
                    "loaded {}",
                    path.display()
                );
                Ok(config)
            }
        }
    }

    fn from_project(root: &Path, project: Project) -> Config {
        Config {
            input: resolve(root, project.input, &["data", "links.json"]),
            output_directory: resolve(root, project.output_directory, &["pages"]),
            slug_index: resolve(root, project.slug_index, &["data", "slugs.json"]),
            extension: project.extension.unwrap_or_else(|| String::from("html")),
            index_href: project
                .index_href
                .unwrap_or_else(|| String::from(DEFAULT_INDEX_HREF)),
            digest: project.digest,
            collisions: project.collisions,
            theme: project.theme,
        }
    }
}

// Joins `path` onto `root`, or `default`'s components when `path` is unset.
fn resolve(root: &Path, path: Option<PathBuf>, default: &[&str]) -> PathBuf {
    match path {
        Some(path) => root.join(path),
        None => default.iter().fold(root.to_owned(), |acc, c| acc.join(c)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = Config::with_root(Path::new("/site"));
        assert_eq!(config.input, Path::new("/site/data/links.json"));
        assert_eq!(config.output_directory, Path::new("/site/pages"));
        assert_eq!(config.slug_index, Path::new("/site/data/slugs.json"));
        assert_eq!(config.extension, "html");
        assert_eq!(config.index_href, "../index.html");
        assert_eq!(config.digest, Algorithm::Md5);
        assert_eq!(config.collisions, CollisionPolicy::Warn);
        assert_eq!(config.theme, Theme::default());
    }

    #[test]
    fn test_missing_project_file_uses_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::from_directory(dir.path())?;
        assert_eq!(config, Config::with_root(dir.path()));
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(PROJECT_FILE), "extension: htm\n")?;
        let missing = dir.path().join("no-such-dir");
        let err = Config::from_directory(&missing).unwrap_err();
        assert!(
            err.to_string().starts_with("Resolving project directory `"),
            "{:#}",
            err
        );
        Ok(())
    }

    #[test]
    fn test_project_file_in_ancestor() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join(PROJECT_FILE),
            "input: links.json\n\
             output_directory: out/links\n\
             extension: htm\n\
             digest: sha256\n\
             collisions: fail\n\
             theme:\n  show_domain: false\n  pill_radius: 999px\n",
        )?;
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!(config.input, dir.path().join("links.json"));
        assert_eq!(config.output_directory, dir.path().join("out/links"));
        assert_eq!(config.slug_index, dir.path().join("data").join("slugs.json"));
        assert_eq!(config.extension, "htm");
        assert_eq!(config.digest, Algorithm::Sha256);
        assert_eq!(config.collisions, CollisionPolicy::Fail);
        assert!(!config.theme.show_domain);
        assert_eq!(config.theme.pill_radius, "999px");
        assert_eq!(config.theme.button_radius, "6px");
        Ok(())
    }

    #[test]
    fn test_missing_project_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_project_file(&dir.path().join(PROJECT_FILE)).unwrap_err();
        assert!(err.to_string().starts_with("Opening project file `"), "{}", err);
    }

    #[test]
    fn test_unknown_key_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(PROJECT_FILE), "outputs: somewhere\n")?;
        let err = Config::from_directory(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("outputs"), "{:#}", err);
        Ok(())
    }
}
