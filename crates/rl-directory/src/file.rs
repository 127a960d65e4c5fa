//! Directory snapshot backend.
//!
//! A snapshot is a tab-separated export of the user directory with one row
//! per person: the uid in the first column, the mail addresses in the
//! second, `;`-separated when multi-valued. Attribute matching is
//! case-insensitive, as it is in the directory the snapshot came from.

use std::collections::HashMap;
use std::path::Path;

use rl_model::{DirectoryAttribute, DirectoryEntry, DirectoryService, DirectoryServiceError};

/// File-backed [`DirectoryService`] over a directory snapshot.
pub struct FileDirectory {
    entries: Vec<SnapshotEntry>,
    by_mail: HashMap<String, Vec<usize>>,
    by_uid: HashMap<String, Vec<usize>>,
}

#[derive(Debug, Clone)]
struct SnapshotEntry {
    uid: Vec<String>,
}

impl FileDirectory {
    pub fn open(path: &Path) -> Result<Self, DirectoryServiceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .flexible(true)
            .from_path(path)
            .map_err(|error| {
                DirectoryServiceError::new(format!(
                    "open directory snapshot {}: {error}",
                    path.display()
                ))
            })?;

        let mut entries = Vec::new();
        let mut by_mail: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_uid: HashMap<String, Vec<usize>> = HashMap::new();

        for record in reader.records() {
            let record = record.map_err(|error| {
                DirectoryServiceError::new(format!(
                    "read directory snapshot {}: {error}",
                    path.display()
                ))
            })?;
            let uid = record.get(0).unwrap_or("").trim();
            if uid.is_empty() {
                continue;
            }
            let idx = entries.len();
            by_uid.entry(uid.to_ascii_lowercase()).or_default().push(idx);
            for mail in record.get(1).unwrap_or("").split(';') {
                let mail = mail.trim();
                if !mail.is_empty() {
                    by_mail
                        .entry(mail.to_ascii_lowercase())
                        .or_default()
                        .push(idx);
                }
            }
            entries.push(SnapshotEntry {
                uid: vec![uid.to_string()],
            });
        }

        Ok(Self {
            entries,
            by_mail,
            by_uid,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DirectoryService for FileDirectory {
    fn search(
        &self,
        attribute: DirectoryAttribute,
        value: &str,
    ) -> Result<Vec<DirectoryEntry>, DirectoryServiceError> {
        let key = value.trim().to_ascii_lowercase();
        let index = match attribute {
            DirectoryAttribute::Mail => &self.by_mail,
            DirectoryAttribute::Uid => &self.by_uid,
        };
        Ok(index
            .get(&key)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&idx| DirectoryEntry {
                        uid: self.entries[idx].uid.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
