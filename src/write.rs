//! Moves rendered pages through the draft/publish lifecycle. A page is first
//! written to the drafts directory as `{slug}.html` and, once approved, is
//! relocated to the published directory under the same name. Pages can also
//! be written straight to the published directory, skipping the draft stage.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const HTML_EXTENSION: &str = "html";

/// Responsible for writing rendered HTML pages to the drafts and published
/// directories. Both directories are created on demand.
pub struct Store<'a> {
    /// The directory in which drafts are written, e.g. `blog/drafts`.
    pub drafts_directory: &'a Path,

    /// The directory in which published pages are written, e.g.
    /// `blog/published`.
    pub published_directory: &'a Path,
}

impl Store<'_> {
    /// The location of the draft for `slug`.
    pub fn draft_path(&self, slug: &str) -> PathBuf {
        self.drafts_directory.join(file_name(slug))
    }

    /// The location of the published page for `slug`.
    pub fn published_path(&self, slug: &str) -> PathBuf {
        self.published_directory.join(file_name(slug))
    }

    /// Writes `html` as the draft for `slug`, silently replacing any existing
    /// draft of the same name. Returns the draft's path.
    pub fn save_draft(&self, slug: &str, html: &str) -> Result<PathBuf> {
        create_dir(self.drafts_directory)?;
        let path = self.draft_path(slug);
        write_file(&path, html)?;
        info!(path = %path.display(), "saved draft");
        Ok(path)
    }

    /// Relocates the draft for `slug` into the published directory and
    /// returns the published path. The draft is removed only after the
    /// published copy has been written.
    pub fn move_to_published(&self, slug: &str) -> Result<PathBuf> {
        let src = self.draft_path(slug);
        if !src.is_file() {
            return Err(Error::DraftNotFound(src));
        }
        let html = std::fs::read_to_string(&src).map_err(|err| Error::Io {
            path: src.clone(),
            err,
        })?;
        let dest = self.write_published(slug, &html)?;
        std::fs::remove_file(&src).map_err(|err| Error::Io {
            path: src.clone(),
            err,
        })?;
        debug!(draft = %src.display(), "removed draft");
        Ok(dest)
    }

    /// Writes `html` straight to the published directory as the page for
    /// `slug`. Returns the published path.
    pub fn write_published(&self, slug: &str, html: &str) -> Result<PathBuf> {
        create_dir(self.published_directory)?;
        let path = self.published_path(slug);
        write_file(&path, html)?;
        info!(path = %path.display(), "published page");
        Ok(path)
    }
}

fn file_name(slug: &str) -> String {
    format!("{}.{}", slug, HTML_EXTENSION)
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| Error::Io {
        path: dir.to_owned(),
        err,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// Returned when publishing a draft that doesn't exist.
    DraftNotFound(PathBuf),

    /// Returned for I/O errors reading, writing, or removing pages.
    Io { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DraftNotFound(path) => {
                write!(f, "Draft not found: {}", path.display())
            }
            Error::Io { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DraftNotFound(_) => None,
            Error::Io { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn store(root: &Path) -> (PathBuf, PathBuf) {
        (root.join("blog/drafts"), root.join("blog/published"))
    }

    #[test]
    fn test_save_draft_overwrites() -> TestResult {
        let dir = tempfile::tempdir()?;
        let (drafts, published) = store(dir.path());
        let store = Store {
            drafts_directory: &drafts,
            published_directory: &published,
        };

        let path = store.save_draft("zero-trust", "first")?;
        assert_eq!(drafts.join("zero-trust.html"), path);
        store.save_draft("zero-trust", "second")?;
        assert_eq!("second", std::fs::read_to_string(&path)?);
        Ok(())
    }

    #[test]
    fn test_move_to_published() -> TestResult {
        let dir = tempfile::tempdir()?;
        let (drafts, published) = store(dir.path());
        let store = Store {
            drafts_directory: &drafts,
            published_directory: &published,
        };

        let draft = store.save_draft("zero-trust", "<p>page</p>")?;
        let dest = store.move_to_published("zero-trust")?;
        assert_eq!(published.join("zero-trust.html"), dest);
        assert_eq!("<p>page</p>", std::fs::read_to_string(&dest)?);
        assert!(!draft.exists());
        Ok(())
    }

    #[test]
    fn test_move_missing_draft() -> TestResult {
        let dir = tempfile::tempdir()?;
        let (drafts, published) = store(dir.path());
        let store = Store {
            drafts_directory: &drafts,
            published_directory: &published,
        };

        match store.move_to_published("missing") {
            Err(Error::DraftNotFound(path)) => {
                assert_eq!(drafts.join("missing.html"), path)
            }
            other => panic!("wanted DraftNotFound; found {:?}", other),
        }
        assert!(!published.exists());
        Ok(())
    }
}
