//! Pushes published articles to the site's remote. The whole sequence
//! (`git add .`, `git commit -m <message>`, `git push`) is one opaque
//! operation: it either succeeds as a whole or reports the first step that
//! failed along with its diagnostic output.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{debug, warn};

/// Records published changes in version control and pushes them upstream.
pub trait VersionControl {
    /// Commits every change in the working directory with `message` and
    /// pushes it. Callers treat failure as a warning: the files on disk are
    /// already published.
    fn publish(&self, message: &str) -> Result<()>;
}

/// A [`VersionControl`] backed by the `git` executable.
pub struct Git {
    work_dir: PathBuf,
    program: OsString,
}

impl Git {
    /// Runs `git` from the `PATH` in `work_dir`.
    pub fn new(work_dir: &Path) -> Git {
        Git::with_program(work_dir, "git")
    }

    /// Runs `program` in place of `git`.
    pub fn with_program<S: Into<OsString>>(work_dir: &Path, program: S) -> Git {
        Git {
            work_dir: work_dir.to_owned(),
            program: program.into(),
        }
    }

    fn run(&self, step: &'static str, args: &[&str]) -> Result<()> {
        debug!(step, dir = %self.work_dir.display(), "running git");
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.work_dir)
            .output()
            .map_err(|err| Error::Spawn { step, err })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        warn!(
            step,
            status = %output.status,
            stderr = %stderr,
            "git step failed"
        );
        Err(Error::Step {
            step,
            status: output.status,
            stderr,
        })
    }
}

impl VersionControl for Git {
    fn publish(&self, message: &str) -> Result<()> {
        self.run("add", &["add", "."])?;
        self.run("commit", &["commit", "-m", message])?;
        self.run("push", &["push"])
    }
}

/// The result of a version-control operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed version-control step.
#[derive(Debug)]
pub enum Error {
    /// Returned when the executable couldn't be started at all.
    Spawn {
        step: &'static str,
        err: std::io::Error,
    },

    /// Returned when a step exited unsuccessfully. Holds the step's trimmed
    /// standard error.
    Step {
        step: &'static str,
        status: ExitStatus,
        stderr: String,
    },
}

impl Error {
    /// The name of the step that failed (`add`, `commit`, or `push`).
    pub fn step(&self) -> &'static str {
        match self {
            Error::Spawn { step, .. } => *step,
            Error::Step { step, .. } => *step,
        }
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Spawn { step, err } => {
                write!(f, "Git error: running `git {}`: {}", step, err)
            }
            Error::Step {
                step,
                status,
                stderr,
            } => {
                if stderr.is_empty() {
                    write!(f, "Git error: `git {}` failed ({})", step, status)
                } else {
                    write!(
                        f,
                        "Git error: `git {}` failed ({}): {}",
                        step, status, stderr
                    )
                }
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Spawn { step: _, err } => Some(err),
            Error::Step { .. } => None,
        }
    }
}

#[cfg(all(test, unix))]
mod test {
    use super::*;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    // Writes one shell script per git subcommand into `dir`. Running the
    // publisher with `sh` as its program then executes `sh add .`,
    // `sh commit -m ...`, and `sh push` against those scripts. Each script
    // appends its name to `log`; `commit` exits with `commit_status`.
    fn fake_git(dir: &Path, commit_status: i32) -> std::io::Result<()> {
        for step in &["add", "push"] {
            std::fs::write(dir.join(step), format!("echo {} >> log\n", step))?;
        }
        std::fs::write(
            dir.join("commit"),
            format!("echo commit >> log\nexit {}\n", commit_status),
        )
    }

    fn steps_run(dir: &Path) -> std::io::Result<Vec<String>> {
        let log = std::fs::read_to_string(dir.join("log"))?;
        Ok(log.lines().map(str::to_owned).collect())
    }

    #[test]
    fn test_all_steps_succeed() -> TestResult {
        let dir = tempfile::tempdir()?;
        fake_git(dir.path(), 0)?;
        Git::with_program(dir.path(), "sh").publish("New blog post: Test")?;
        assert_eq!(vec!["add", "commit", "push"], steps_run(dir.path())?);
        Ok(())
    }

    #[test]
    fn test_first_failure_stops_the_sequence() -> TestResult {
        let dir = tempfile::tempdir()?;
        let git = Git::with_program(dir.path(), "false");
        match git.publish("New blog post: Test") {
            Err(err @ Error::Step { .. }) => assert_eq!("add", err.step()),
            other => panic!("wanted a failed `add` step; found {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_failed_commit_skips_push() -> TestResult {
        let dir = tempfile::tempdir()?;
        fake_git(dir.path(), 1)?;
        let git = Git::with_program(dir.path(), "sh");
        match git.publish("New blog post: Test") {
            Err(err @ Error::Step { .. }) => assert_eq!("commit", err.step()),
            other => panic!("wanted a failed `commit` step; found {:?}", other),
        }
        assert_eq!(vec!["add", "commit"], steps_run(dir.path())?);
        Ok(())
    }

    #[test]
    fn test_missing_executable() -> TestResult {
        let dir = tempfile::tempdir()?;
        let git = Git::with_program(dir.path(), "./no-such-git-binary");
        match git.publish("msg") {
            Err(Error::Spawn { step, .. }) => assert_eq!("add", step),
            other => panic!("wanted a spawn error; found {:?}", other),
        }
        Ok(())
    }
}
