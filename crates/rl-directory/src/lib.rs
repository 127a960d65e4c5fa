//! Email-to-username resolution.
//!
//! [`DirectoryLookup`] wraps any [`DirectoryService`] with an in-memory
//! cache and a two-strategy search: an exact match on the mail attribute,
//! then a username guess from the local part of the address. A miss is a
//! normal outcome; only service failures are errors.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use rl_model::{DirectoryAttribute, DirectoryService, DirectoryServiceError};

mod file;

pub use file::FileDirectory;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(#[from] DirectoryServiceError),
}

/// Cached username lookup over a directory service.
///
/// The cache is append-only for the lifetime of a run and cleared only by
/// explicit request.
pub struct DirectoryLookup {
    service: Box<dyn DirectoryService>,
    cache: HashMap<String, String>,
    use_cache: bool,
}

impl DirectoryLookup {
    pub fn new(service: Box<dyn DirectoryService>, use_cache: bool) -> Self {
        Self {
            service,
            cache: HashMap::new(),
            use_cache,
        }
    }

    /// Resolve an email address to a username.
    ///
    /// Strategies, short-circuiting on first success:
    /// 1. the cache, when enabled;
    /// 2. exact search on the mail attribute;
    /// 3. if the local part of the address looks like a bare username
    ///    (non-empty, no `.`), search it as the uid attribute.
    ///
    /// `Ok(None)` means no match; the caller degrades to an empty username.
    pub fn find(&mut self, email: &str) -> Result<Option<String>, DirectoryError> {
        if self.use_cache
            && let Some(uid) = self.cache.get(email)
        {
            return Ok(Some(uid.clone()));
        }

        if let Some(uid) = self.search(DirectoryAttribute::Mail, email)? {
            self.remember(email, &uid);
            return Ok(Some(uid));
        }

        let local = email.split('@').next().unwrap_or("");
        if !local.is_empty() && !local.contains('.') {
            if let Some(uid) = self.search(DirectoryAttribute::Uid, local)? {
                self.remember(email, &uid);
                return Ok(Some(uid));
            }
        }

        debug!(email, "no directory match");
        Ok(None)
    }

    /// Empty the cache.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn search(
        &self,
        attribute: DirectoryAttribute,
        value: &str,
    ) -> Result<Option<String>, DirectoryError> {
        let entries = self.service.search(attribute, value)?;
        // The first uid value is the canonical username.
        Ok(entries
            .iter()
            .find_map(|entry| entry.uid.first())
            .cloned())
    }

    fn remember(&mut self, email: &str, uid: &str) {
        if self.use_cache {
            self.cache.insert(email.to_string(), uid.to_string());
        }
    }
}
