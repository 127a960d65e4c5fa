//! Collaborator contracts consumed by the export core.
//!
//! The transformation engine only ever sees these narrow interfaces; the
//! concrete list source, directory backend, email-selection policy, and any
//! persistence are integration concerns.

use thiserror::Error;

use crate::error::ModelError;
use crate::list::ReadingList;

/// Resolves a list identifier to a full list object.
pub trait ListSource {
    fn resolve(&self, uri: &str) -> Result<ReadingList, ModelError>;
}

/// Directory attributes the lookup strategies search on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryAttribute {
    Mail,
    Uid,
}

impl DirectoryAttribute {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mail => "mail",
            Self::Uid => "uid",
        }
    }
}

/// A single directory entry. The uid attribute may be multi-valued; the
/// first value is the canonical username.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub uid: Vec<String>,
}

/// Failure talking to the directory backend (connection, auth, read).
#[derive(Debug, Error)]
#[error("directory service: {message}")]
pub struct DirectoryServiceError {
    pub message: String,
}

impl DirectoryServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Attribute-equality search over a user directory.
pub trait DirectoryService {
    fn search(
        &self,
        attribute: DirectoryAttribute,
        value: &str,
    ) -> Result<Vec<DirectoryEntry>, DirectoryServiceError>;
}

/// Chooses the single primary address from a person's email list.
pub trait EmailSelector {
    fn primary_email(&self, candidates: &[String]) -> Option<String>;
}

/// Get/set contract for integrators persisting lookup state between runs.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}
