//! Normalizes raw language-model output into an [`ArticleRecord`]. The model
//! is instructed to answer with a three-line metadata header, a `---`
//! separator, and an HTML body:
//!
//! ```text
//! SEO_TITLE: Zero Trust Architecture: A 2024 Guide
//! META_DESCRIPTION: What zero trust means for enterprise networks.
//! KEYWORDS: zero trust, network security, identity, access, compliance
//! ---
//! <h1>Zero Trust Architecture</h1>
//! <p>...</p>
//! ```

use crate::article::{
    or_default, truncate_chars, ArticleRecord, DEFAULT_CONTENT_HTML,
    DEFAULT_GENERATED_TITLE, DEFAULT_KEYWORDS, DEFAULT_META_DESCRIPTION,
    META_DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS,
};
use std::fmt;

const SEPARATOR: &str = "---";
const TITLE_LABEL: &str = "SEO_TITLE:";
const META_DESCRIPTION_LABEL: &str = "META_DESCRIPTION:";
const KEYWORDS_LABEL: &str = "KEYWORDS:";

/// Parses model output into an [`ArticleRecord`]. Header lines are matched
/// by label prefix and the first line carrying a label wins. Missing fields
/// fall back to their defaults. The only failure is a missing `---`
/// separator, which means the output can't be used at all.
pub fn parse_completion(raw: &str) -> Result<ArticleRecord, Error> {
    let raw = raw.replace("\r\n", "\n");
    let raw = raw.trim();

    let i = raw.find(SEPARATOR).ok_or(Error::MissingSeparator)?;
    let (header, body) = (&raw[..i], &raw[i + SEPARATOR.len()..]);

    let mut title: Option<&str> = None;
    let mut meta_description: Option<&str> = None;
    let mut keywords: Option<&str> = None;
    for line in header.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix(TITLE_LABEL) {
            title.get_or_insert(value);
        } else if let Some(value) = line.strip_prefix(META_DESCRIPTION_LABEL) {
            meta_description.get_or_insert(value);
        } else if let Some(value) = line.strip_prefix(KEYWORDS_LABEL) {
            keywords.get_or_insert(value);
        }
    }

    let field = |value: Option<&str>, max: Option<usize>| -> String {
        let value = value.unwrap_or_default().trim();
        match max {
            Some(max) => truncate_chars(value, max).to_owned(),
            None => value.to_owned(),
        }
    };

    Ok(ArticleRecord {
        title: or_default(
            field(title, Some(TITLE_MAX_CHARS)),
            DEFAULT_GENERATED_TITLE,
        ),
        meta_description: or_default(
            field(meta_description, Some(META_DESCRIPTION_MAX_CHARS)),
            DEFAULT_META_DESCRIPTION,
        ),
        keywords: or_default(field(keywords, None), DEFAULT_KEYWORDS),
        content_html: or_default(body.trim().to_owned(), DEFAULT_CONTENT_HTML),
    })
}

/// Represents unusable model output.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Returned when the output has no `---` separating the metadata header
    /// from the body.
    MissingSeparator,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingSeparator => {
                write!(f, "Generated content missing required '---' separator.")
            }
        }
    }
}

impl std::error::Error for Error {}
