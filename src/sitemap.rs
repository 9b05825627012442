//! Support for keeping the site's `sitemap.xml` up to date as articles are
//! published. The document is treated as text: entries are spliced in before
//! the closing `</urlset>` tag rather than parsed and re-serialized, so any
//! hand edits to the file survive.

use crate::template::escape_html;
use chrono::{NaiveDate, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const CLOSING_TAG: &str = "</urlset>";

const EMPTY_SITEMAP: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">
</urlset>
";

/// A sitemap document on disk.
pub struct Sitemap<'a> {
    path: &'a Path,
}

impl<'a> Sitemap<'a> {
    pub fn new(path: &'a Path) -> Sitemap<'a> {
        Sitemap { path }
    }

    /// Creates the sitemap with an empty `<urlset>` if it doesn't exist.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|err| self.io_error(err))?;
        }
        std::fs::write(self.path, EMPTY_SITEMAP)
            .map_err(|err| self.io_error(err))
    }

    /// Appends an entry for `url` dated today (UTC).
    pub fn append_today(&self, url: &str) -> Result<()> {
        self.append(url, Utc::now().naive_utc().date())
    }

    /// Appends an entry for `url` with the given `lastmod` date. Entries are
    /// never deduplicated; appending the same URL twice yields two entries.
    /// If the closing `</urlset>` tag is missing, the entry is appended to
    /// the end of the document followed by a new closing tag.
    pub fn append(&self, url: &str, lastmod: NaiveDate) -> Result<()> {
        self.ensure_exists()?;
        let text = std::fs::read_to_string(self.path)
            .map_err(|err| self.io_error(err))?;
        let entry = entry(url, lastmod);

        let text = match text.rfind(CLOSING_TAG) {
            Some(i) => format!("{}{}{}", &text[..i], entry, &text[i..]),
            None => {
                warn!(
                    path = %self.path.display(),
                    "sitemap has no closing tag; appending one"
                );
                format!("{}\n{}{}\n", text.trim_end(), entry, CLOSING_TAG)
            }
        };

        std::fs::write(self.path, text).map_err(|err| self.io_error(err))?;
        info!(url, lastmod = %lastmod, "added sitemap entry");
        Ok(())
    }

    fn io_error(&self, err: std::io::Error) -> Error {
        Error {
            path: self.path.to_owned(),
            err,
        }
    }
}

fn entry(url: &str, lastmod: NaiveDate) -> String {
    format!(
        "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n  </url>\n",
        escape_html(url),
        lastmod.format("%Y-%m-%d"),
    )
}

/// The result of a fallible sitemap operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an I/O problem reading or writing the sitemap.
#[derive(Debug)]
pub struct Error {
    path: PathBuf,
    err: std::io::Error,
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Updating sitemap '{}': {}", self.path.display(), self.err)
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_append_creates_sitemap() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sitemap.xml");
        let url = "https://example.org/blog/published/a.html";
        Sitemap::new(&path).append(url, date())?;

        assert_eq!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">
  <url>
    <loc>https://example.org/blog/published/a.html</loc>
    <lastmod>2024-03-09</lastmod>
  </url>
</urlset>
",
            std::fs::read_to_string(&path)?
        );
        Ok(())
    }

    #[test]
    fn test_append_twice_keeps_order_and_duplicates() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sitemap.xml");
        let sitemap = Sitemap::new(&path);
        sitemap.append("https://example.org/a.html", date())?;
        sitemap.append("https://example.org/b.html", date())?;
        sitemap.append("https://example.org/a.html", date())?;

        let text = std::fs::read_to_string(&path)?;
        let locs: Vec<&str> = text
            .lines()
            .filter_map(|l| l.trim().strip_prefix("<loc>"))
            .filter_map(|l| l.strip_suffix("</loc>"))
            .collect();
        assert_eq!(
            vec![
                "https://example.org/a.html",
                "https://example.org/b.html",
                "https://example.org/a.html"
            ],
            locs
        );
        assert!(text.trim_end().ends_with(CLOSING_TAG));
        Ok(())
    }

    #[test]
    fn test_append_today_uses_utc_date() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sitemap.xml");
        let before = Utc::now().naive_utc().date();
        Sitemap::new(&path).append_today("https://example.org/a.html")?;
        let after = Utc::now().naive_utc().date();

        let text = std::fs::read_to_string(&path)?;
        assert_eq!(1, text.matches("<url>").count());
        let lastmod = |date: NaiveDate| {
            format!("<lastmod>{}</lastmod>", date.format("%Y-%m-%d"))
        };
        assert!(
            text.contains(&lastmod(before)) || text.contains(&lastmod(after))
        );
        Ok(())
    }

    #[test]
    fn test_missing_closing_tag_is_repaired() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sitemap.xml");
        std::fs::write(&path, "<?xml version=\"1.0\"?>\n<urlset>\n\n")?;
        Sitemap::new(&path).append("https://example.org/a.html", date())?;

        assert_eq!(
            "<?xml version=\"1.0\"?>
<urlset>
  <url>
    <loc>https://example.org/a.html</loc>
    <lastmod>2024-03-09</lastmod>
  </url>
</urlset>
",
            std::fs::read_to_string(&path)?
        );
        Ok(())
    }

    #[test]
    fn test_existing_sitemap_is_not_replaced() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sitemap.xml");
        std::fs::write(&path, "<urlset><!-- keep --></urlset>")?;
        Sitemap::new(&path).ensure_exists()?;
        assert_eq!(
            "<urlset><!-- keep --></urlset>",
            std::fs::read_to_string(&path)?
        );
        Ok(())
    }
}
