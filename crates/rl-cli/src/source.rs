//! File-backed reading-list object source.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use tracing::debug;

use rl_model::{ListSource, ModelError, ReadingList};

/// Resolves a list URI to `<dir>/<code>.json`, where the code is the last
/// path segment of the URI, and deserializes the document.
pub struct JsonListSource {
    dir: PathBuf,
}

impl JsonListSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ListSource for JsonListSource {
    fn resolve(&self, uri: &str) -> Result<ReadingList, ModelError> {
        let trimmed = uri.trim_end_matches('/');
        let code = trimmed.rsplit('/').next().unwrap_or(trimmed);
        let path = self.dir.join(format!("{code}.json"));
        debug!(list_uri = %uri, path = %path.display(), "resolving list document");
        let file = File::open(&path)
            .map_err(|error| ModelError::resolve(uri, format!("open {}: {error}", path.display())))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|error| ModelError::resolve(uri, format!("parse {}: {error}", path.display())))
    }
}
