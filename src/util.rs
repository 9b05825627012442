use anyhow::{anyhow, Result};
use std::path::Path;

pub fn read_to_string(path: &Path, kind: &str) -> Result<String> {
    match std::fs::read_to_string(path) {
        Err(e) => {
            Err(anyhow!("Reading {} file `{}`: {}", kind, path.display(), e))
        }
        Ok(contents) => Ok(contents),
    }
}
