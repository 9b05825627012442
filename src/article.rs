//! Defines the [`ArticleRecord`] type, the one canonical shape every article
//! takes on its way to disk regardless of whether it came from the language
//! model or from a Markdown draft. Also defines the defaults that stand in
//! for missing fields and the [`slugify`] function that derives file names
//! from titles.

/// The maximum length of an article title, in characters.
pub const TITLE_MAX_CHARS: usize = 60;

/// The maximum length of a meta description, in characters.
pub const META_DESCRIPTION_MAX_CHARS: usize = 160;

/// The maximum length of a slug, in characters.
pub const SLUG_MAX_CHARS: usize = 80;

/// The maximum number of keywords collected from a Markdown draft.
pub const MAX_KEYWORDS: usize = 5;

/// Title used when the model output doesn't name one.
pub const DEFAULT_GENERATED_TITLE: &str = "Cybersecurity Article";

/// Title used when a Markdown draft has neither a title label nor a heading.
pub const DEFAULT_DRAFT_TITLE: &str = "Blog Post";

pub const DEFAULT_META_DESCRIPTION: &str =
    "Cybersecurity insights from VarraTek Security.";

pub const DEFAULT_KEYWORDS: &str =
    "cybersecurity, security, enterprise, compliance, risk";

pub const DEFAULT_CONTENT_HTML: &str = "<p>Content could not be generated.</p>";

/// The slug used when a title has nothing left after slugification.
const FALLBACK_SLUG: &str = "post";

/// A fully-populated article, ready to be rendered into the page template.
/// No field is ever empty: missing source values are replaced by the
/// defaults in this module before a record is constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArticleRecord {
    /// The SEO title, at most [`TITLE_MAX_CHARS`] characters.
    pub title: String,

    /// The meta description, at most [`META_DESCRIPTION_MAX_CHARS`]
    /// characters.
    pub meta_description: String,

    /// Comma-separated keywords.
    pub keywords: String,

    /// The article body as an HTML fragment. This is trusted markup and is
    /// never escaped on rendering.
    pub content_html: String,
}

impl ArticleRecord {
    /// The file-name slug for this article (see [`slugify`]).
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }
}

/// Returns `value` unless it is empty, in which case `default` is returned.
pub fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_owned()
    } else {
        value
    }
}

/// Returns the first `max` characters of `s`. Never splits a character and
/// makes no attempt to respect word boundaries.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Converts a title into a file-name slug: lowercase ASCII letters, digits,
/// and single hyphens, no leading or trailing hyphen, and at most
/// [`SLUG_MAX_CHARS`] characters. Punctuation is dropped rather than turned
/// into a separator, so `"Don't Panic"` becomes `"dont-panic"`.
pub fn slugify(title: &str) -> String {
    let stripped: String = title
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| {
            c.is_alphanumeric() || c.is_whitespace() || *c == '_' || *c == '-'
        })
        .collect();

    let slug = slug::slugify(stripped);
    let slug = truncate_chars(&slug, SLUG_MAX_CHARS).trim_matches('-');
    if slug.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        slug.to_owned()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_slugify_title() {
        assert_eq!(
            "zero-trust-architecture-a-2024-guide",
            slugify("Zero Trust Architecture: A 2024 Guide!")
        );
    }

    #[test]
    fn test_slugify_drops_punctuation_without_separating() {
        assert_eq!("dont-panic", slugify("Don't Panic"));
        assert_eq!("ransomware-101", slugify("  Ransomware -- 101  "));
    }

    #[test]
    fn test_slugify_is_idempotent() {
        let titles = [
            "Zero Trust Architecture: A 2024 Guide!",
            "SOC 2 vs. ISO 27001",
            "snake_case_title",
            "Résumé Fraud & Phishing",
        ];
        for title in titles.iter() {
            let once = slugify(title);
            assert_eq!(once, slugify(title));
            assert_eq!(once, slugify(&once));
        }
    }

    #[test]
    fn test_slugify_charset_and_length() {
        let title = "A Very Long Title About Endpoint Detection And Response \
                     Platforms, Their History, Their Future, And More Besides!";
        let slug = slugify(title);
        assert!(slug.chars().count() <= SLUG_MAX_CHARS);
        assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }

    #[test]
    fn test_slugify_trims_hyphen_left_by_truncation() {
        // 79 characters followed by a word break lands a hyphen at 80.
        let title = format!("{} tail", "a".repeat(79));
        let slug = slugify(&title);
        assert_eq!("a".repeat(79), slug);
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!("post", slugify("?!?"));
        assert_eq!("post", slugify(""));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!("abc", truncate_chars("abcdef", 3));
        assert_eq!("ab", truncate_chars("ab", 3));
        assert_eq!("éé", truncate_chars("ééé", 2));
    }

    #[test]
    fn test_or_default() {
        assert_eq!("x", or_default(String::new(), "x"));
        assert_eq!("y", or_default("y".to_owned(), "x"));
    }
}
