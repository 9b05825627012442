//! Renders [`ArticleRecord`]s into the site's page template. The template is
//! plain HTML carrying four placeholders: `{{title}}`,
//! `{{meta_description}}`, `{{keywords}}`, and `{{content}}`. The first three
//! are HTML-escaped on substitution; the content is trusted markup and is
//! inserted as-is.

use crate::article::ArticleRecord;
use std::fmt;
use std::path::{Path, PathBuf};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A loaded page template.
pub struct Template {
    contents: String,
}

impl Template {
    /// Loads the template file at `path`.
    pub fn load(path: &Path) -> Result<Template> {
        std::fs::read_to_string(path)
            .map(Template::from)
            .map_err(|err| Error::Open {
                path: path.to_owned(),
                err,
            })
    }

    /// Substitutes every placeholder in the template with the corresponding
    /// field of `record`. Substitution is a single pass, so placeholder text
    /// that appears inside a substituted value is left alone. Unknown
    /// `{{...}}` sequences are copied through unchanged.
    pub fn render(&self, record: &ArticleRecord) -> String {
        let capacity = self.contents.len() + record.content_html.len();
        let mut out = String::with_capacity(capacity);
        let mut rest = self.contents.as_str();
        while let Some(start) = rest.find(OPEN) {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            match placeholder(tail, record) {
                Some((value, consumed)) => {
                    out.push_str(&value);
                    rest = &tail[consumed..];
                }
                None => {
                    out.push_str(OPEN);
                    rest = &tail[OPEN.len()..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl From<String> for Template {
    fn from(contents: String) -> Template {
        Template { contents }
    }
}

// Matches a known placeholder at the start of `tail`, returning its
// substitution and the number of bytes it occupied.
fn placeholder(tail: &str, record: &ArticleRecord) -> Option<(String, usize)> {
    let end = tail.find(CLOSE)?;
    let name = &tail[OPEN.len()..end];
    let value = match name {
        "title" => escape_html(&record.title),
        "meta_description" => escape_html(&record.meta_description),
        "keywords" => escape_html(&record.keywords),
        "content" => record.content_html.clone(),
        _ => return None,
    };
    Some((value, end + CLOSE.len()))
}

/// Escapes `&`, `<`, `>`, and `"` for use in HTML text and attribute values.
/// Each character is replaced exactly once, so entities introduced by the
/// escaping are never escaped again.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reads an article title back out of a rendered page's
/// `<title>{title} — {site_name}</title>` element. Returns `None` when the
/// page has no such element. The title comes back as it appears in the
/// markup, i.e., still escaped.
pub fn extract_title<'a>(html: &'a str, site_name: &str) -> Option<&'a str> {
    const OPEN_TAG: &str = "<title>";
    const CLOSE_TAG: &str = "</title>";
    let suffix = format!(" — {}", site_name);

    html.match_indices(OPEN_TAG).find_map(|(i, _)| {
        let inner = &html[i + OPEN_TAG.len()..];
        let inner = &inner[..inner.find(CLOSE_TAG)?];
        if inner.contains('\n') {
            return None;
        }
        let title = inner.strip_suffix(&suffix)?.trim();
        if title.is_empty() {
            None
        } else {
            Some(title)
        }
    })
}

/// Represents the result of a template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a template.
#[derive(Debug)]
pub enum Error {
    /// Returned when the template file can't be read.
    Open { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Template not found: {}: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
        }
    }
}
