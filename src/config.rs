use crate::openai::{DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// The name of the optional project file.
pub const PROJECT_FILE: &str = "draftpress.yaml";

/// The environment variable that overrides `site_base_url`.
pub const BASE_URL_VAR: &str = "SITE_BASE_URL";

const DEFAULT_SITE_BASE_URL: &str = "https://winrush.github.io/VarraTek";
const DEFAULT_SITE_NAME: &str = "VarraTek Security";

#[derive(Deserialize)]
#[serde(default)]
struct Project {
    site_base_url: String,
    site_name: String,
    template: PathBuf,
    drafts_path: String,
    published_path: String,
    sitemap: PathBuf,
    model: String,
    temperature: f32,
}

impl Default for Project {
    fn default() -> Self {
        Project {
            site_base_url: DEFAULT_SITE_BASE_URL.to_owned(),
            site_name: DEFAULT_SITE_NAME.to_owned(),
            template: PathBuf::from("blog_template.html"),
            drafts_path: "blog/drafts".to_owned(),
            published_path: "blog/published".to_owned(),
            sitemap: PathBuf::from("sitemap.xml"),
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

pub struct Config {
    /// The directory holding the project file (or the working directory
    /// when there is none). Version-control commands run here.
    pub root_directory: PathBuf,
    pub site_name: String,
    pub template: PathBuf,
    pub drafts_directory: PathBuf,
    pub published_directory: PathBuf,

    /// The URL of the published directory. Always ends in a slash.
    pub published_url: Url,
    pub sitemap: PathBuf,
    pub model: String,
    pub temperature: f32,
}

impl Config {
    /// Loads configuration for `dir`, honoring [`BASE_URL_VAR`].
    pub fn load(dir: &Path) -> Result<Config> {
        let base_url = std::env::var(BASE_URL_VAR).ok();
        Config::from_directory(dir, base_url.as_deref())
    }

    /// Searches `dir` and its ancestors for [`PROJECT_FILE`]. Without one,
    /// the defaults apply with `dir` as the project root. A relative `dir` is
    /// resolved against the working directory first.
    pub fn from_directory(
        dir: &Path,
        base_url_override: Option<&str>,
    ) -> Result<Config> {
        let cwd = std::env::current_dir()
            .context("Can't determine the working directory")?;
        Config::search(&absolute(&cwd, dir), base_url_override)
    }

    fn search(dir: &Path, base_url_override: Option<&str>) -> Result<Config> {
        let found = dir
            .ancestors()
            .map(|d| d.join(PROJECT_FILE))
            .find(|p| p.is_file());
        match found {
            Some(path) => Config::from_project_file(&path, base_url_override)
                .map_err(|e| {
                    anyhow!(
                        "Loading configuration `{}`: {:#}",
                        path.display(),
                        e
                    )
                }),
            None => {
                Config::from_project(dir, Project::default(), base_url_override)
            }
        }
    }

    pub fn from_project_file(
        path: &Path,
        base_url_override: Option<&str>,
    ) -> Result<Config> {
        use crate::util::read_to_string;
        let contents = read_to_string(path, "project")?;
        let project: Project = if contents.trim().is_empty() {
            Project::default()
        } else {
            serde_yaml::from_str(&contents)?
        };
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for project file path '{:?}'",
                path
            )),
            Some(project_root) => {
                Config::from_project(project_root, project, base_url_override)
            }
        }
    }

    fn from_project(
        project_root: &Path,
        project: Project,
        base_url_override: Option<&str>,
    ) -> Result<Config> {
        let base_url = match base_url_override {
            Some(url) if !url.trim().is_empty() => url,
            _ => project.site_base_url.as_str(),
        };
        let published_url = directory_url(base_url)?
            .join(&directory_path(&project.published_path))
            .with_context(|| {
                format!("Invalid published_path `{}`", project.published_path)
            })?;

        Ok(Config {
            root_directory: project_root.to_owned(),
            site_name: project.site_name,
            template: project_root.join(project.template),
            drafts_directory: project_root
                .join(project.drafts_path.trim_matches('/')),
            published_directory: project_root
                .join(project.published_path.trim_matches('/')),
            published_url,
            sitemap: project_root.join(project.sitemap),
            model: project.model,
            temperature: project.temperature,
        })
    }

    /// The public URL of the published page for `slug`.
    pub fn published_url_for(
        &self,
        slug: &str,
    ) -> std::result::Result<Url, url::ParseError> {
        self.published_url.join(&format!("{}.html", slug))
    }
}

// NOTE: a trailing slash is significant to [`Url::join`]. Without it the last
// path segment is treated as a file name and replaced, so both the base URL
// and the published path are normalized to end in exactly one slash.
fn directory_url(base: &str) -> Result<Url> {
    let base = base.trim().trim_end_matches('/');
    Url::parse(&format!("{}/", base))
        .with_context(|| format!("Invalid site base URL `{}`", base))
}

// Joins `dir` onto `cwd` and folds away `.` and `..` so that `ancestors()`
// walks real parent directories instead of stopping at `""`.
fn absolute(cwd: &Path, dir: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in cwd.join(dir).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn directory_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = path.trim_matches('/');
    if path.is_empty() {
        String::new()
    } else {
        format!("{}/", path)
    }
}
