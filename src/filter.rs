//! Entry filters deciding which entries below a target get deleted.
//!
//! The target root itself always participates; filters are consulted for
//! every entry underneath it. A rejected directory is skipped whole.

use crate::error::Result;
use regex::RegexSet;
use std::path::Path;

/// Decides, per entry, whether it participates in a delete.
///
/// Must be pure: the same path always yields the same answer.
pub trait EntryFilter: Send + Sync {
    fn accept(&self, path: &Path) -> bool;
}

impl<F> EntryFilter for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn accept(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Accepts every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl EntryFilter for AcceptAll {
    fn accept(&self, _path: &Path) -> bool {
        true
    }
}

/// Rejects entries whose file name matches any exclude pattern.
#[derive(Debug, Clone)]
pub struct NameFilter {
    excludes: RegexSet,
}

impl NameFilter {
    /// Compiles `patterns` into a filter. An empty list accepts everything.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            excludes: RegexSet::new(patterns)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.excludes.is_empty()
    }

    pub fn patterns(&self) -> &[String] {
        self.excludes.patterns()
    }
}

impl EntryFilter for NameFilter {
    fn accept(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => !self.excludes.is_match(&name.to_string_lossy()),
            None => true,
        }
    }
}
