//! Exports the [`Publisher`] which stitches together the high-level steps of
//! getting an article onto the site: normalizing the source text
//! ([`crate::completion`] or [`crate::parser`]), rendering it into the page
//! template ([`crate::template`]), moving it through the draft and published
//! directories ([`crate::write`]), recording it in the sitemap
//! ([`crate::sitemap`]), and pushing the result ([`crate::git`]).

use crate::article::{slugify, ArticleRecord};
use crate::completion::{parse_completion, Error as CompletionError};
use crate::config::Config;
use crate::git::{Error as GitError, VersionControl};
use crate::openai::{
    system_prompt, user_prompt, CompletionService, Error as OpenAiError,
};
use crate::parser::{parse_draft, Error as ParseError};
use crate::sitemap::{Error as SitemapError, Sitemap};
use crate::template::{extract_title, Error as TemplateError, Template};
use crate::write::{Error as WriteError, Store};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

/// A freshly generated article saved in the drafts directory.
#[derive(Debug)]
pub struct Draft {
    pub path: PathBuf,
    pub slug: String,
    pub title: String,
}

/// The outcome of publishing an article. Publishing succeeds once the page
/// and sitemap are on disk; `push_error` records a version-control failure
/// that happened afterwards.
#[derive(Debug)]
pub struct Publication {
    pub path: PathBuf,
    pub url: Url,
    pub title: String,
    pub push_error: Option<GitError>,
}

impl Publication {
    /// Whether the change made it to the remote.
    pub fn pushed(&self) -> bool {
        self.push_error.is_none()
    }
}

/// Runs the generate/draft/publish pipeline for one project.
pub struct Publisher<'a> {
    pub config: &'a Config,
    pub vcs: &'a dyn VersionControl,
}

impl Publisher<'_> {
    fn store(&self) -> Store {
        Store {
            drafts_directory: &self.config.drafts_directory,
            published_directory: &self.config.published_directory,
        }
    }

    fn template(&self) -> Result<Template> {
        Ok(Template::load(&self.config.template)?)
    }

    /// Asks `service` for an article about `topic`, normalizes the answer,
    /// and saves the rendered page as a draft. An existing draft with the
    /// same slug is replaced.
    pub fn create_draft(
        &self,
        service: &dyn CompletionService,
        topic: &str,
    ) -> Result<Draft> {
        let template = self.template()?;
        info!(topic, "generating article");
        let system = system_prompt(&self.config.site_name);
        let raw = service.complete(&system, &user_prompt(topic))?;
        let record = parse_completion(&raw)?;

        let slug = record.slug();
        let path = self.store().save_draft(&slug, &template.render(&record))?;
        Ok(Draft {
            path,
            slug,
            title: record.title,
        })
    }

    /// The title to use in the commit message for a saved draft: the one in
    /// the draft's `<title>` element, falling back to the slug. The draft is
    /// re-read so that hand edits are honored.
    pub fn draft_title(&self, slug: &str) -> Result<String> {
        let path = self.store().draft_path(slug);
        let html = read(&path)?;
        Ok(extract_title(&html, &self.config.site_name)
            .unwrap_or(slug)
            .to_owned())
    }

    /// Moves the draft for `slug` into the published directory, adds it to
    /// the sitemap, and pushes the change.
    pub fn publish_draft(
        &self,
        slug: &str,
        title: &str,
    ) -> Result<Publication> {
        let path = self.store().move_to_published(slug)?;
        self.finish(path, slug, title)
    }

    /// Publishes an existing Markdown (`.md`) or HTML (`.html`) file without
    /// going through the drafts directory. Markdown is parsed and rendered
    /// into the template; HTML is published verbatim. Nothing is written if
    /// the file doesn't exist or has any other extension.
    pub fn publish_existing(&self, path: &Path) -> Result<Publication> {
        if !path.is_file() {
            return Err(Error::NotFound(path.to_owned()));
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        let (slug, title, html) = match extension.as_deref() {
            Some("md") => {
                let template = self.template()?;
                let record: ArticleRecord = parse_draft(&read(path)?)?;
                (record.slug(), record.title.clone(), template.render(&record))
            }
            Some("html") => {
                let html = read(path)?;
                let title = match extract_title(&html, &self.config.site_name) {
                    Some(title) => title.to_owned(),
                    None => path
                        .file_stem()
                        .map(|stem| stem.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                };
                (slugify(&title), title, html)
            }
            _ => return Err(Error::UnsupportedExtension(path.to_owned())),
        };

        let dest = self.store().write_published(&slug, &html)?;
        self.finish(dest, &slug, &title)
    }

    fn finish(
        &self,
        path: PathBuf,
        slug: &str,
        title: &str,
    ) -> Result<Publication> {
        let url = self.config.published_url_for(slug)?;
        Sitemap::new(&self.config.sitemap).append_today(url.as_str())?;

        let message = format!("New blog post: {}", title);
        let push_error = match self.vcs.publish(&message) {
            Ok(()) => {
                info!(url = %url, "published and pushed");
                None
            }
            Err(err) => {
                warn!(error = %err, "published locally but the push failed");
                Some(err)
            }
        };

        Ok(Publication {
            path,
            url,
            title: title.to_owned(),
            push_error,
        })
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| Error::Read {
        path: path.to_owned(),
        err,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for the publishing pipeline. Every variant is fatal to
/// the operation that raised it; version-control failures are not errors
/// (see [`Publication::push_error`]).
#[derive(Debug)]
pub enum Error {
    /// Returned when the file given to [`Publisher::publish_existing`]
    /// doesn't exist.
    NotFound(PathBuf),

    /// Returned when the file given to [`Publisher::publish_existing`] is
    /// neither Markdown nor HTML.
    UnsupportedExtension(PathBuf),

    /// Returned for I/O problems reading source files.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned for errors requesting article text.
    Generate(OpenAiError),

    /// Returned when the generated text can't be used.
    Completion(CompletionError),

    /// Returned for malformed Markdown drafts.
    Parse(ParseError),

    /// Returned when the page template can't be loaded.
    Template(TemplateError),

    /// Returned for errors writing pages to disk.
    Write(WriteError),

    /// Returned for errors updating the sitemap.
    Sitemap(SitemapError),

    /// Returned when the published URL can't be built.
    Url(url::ParseError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(path) => {
                write!(f, "File not found: {}", path.display())
            }
            Error::UnsupportedExtension(path) => write!(
                f,
                "Only .md and .html drafts are supported: {}",
                path.display()
            ),
            Error::Read { path, err } => {
                write!(f, "Reading '{}': {}", path.display(), err)
            }
            Error::Generate(err) => err.fmt(f),
            Error::Completion(err) => err.fmt(f),
            Error::Parse(err) => err.fmt(f),
            Error::Template(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Sitemap(err) => err.fmt(f),
            Error::Url(err) => write!(f, "Building published URL: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NotFound(_) => None,
            Error::UnsupportedExtension(_) => None,
            Error::Read { path: _, err } => Some(err),
            Error::Generate(err) => Some(err),
            Error::Completion(err) => Some(err),
            Error::Parse(err) => Some(err),
            Error::Template(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Sitemap(err) => Some(err),
            Error::Url(err) => Some(err),
        }
    }
}

impl From<OpenAiError> for Error {
    /// Converts [`OpenAiError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: OpenAiError) -> Error {
        Error::Generate(err)
    }
}

impl From<CompletionError> for Error {
    /// Converts [`CompletionError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: CompletionError) -> Error {
        Error::Completion(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<TemplateError> for Error {
    /// Converts [`TemplateError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: TemplateError) -> Error {
        Error::Template(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<SitemapError> for Error {
    /// Converts [`SitemapError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: SitemapError) -> Error {
        Error::Sitemap(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts [`url::ParseError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}
