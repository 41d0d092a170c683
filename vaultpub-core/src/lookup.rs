//! First-wins name lookups used by the link rewriter.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use vaultpub_types::DocPath;

/// Name → destination lookup where the first insertion for a name wins
///
/// Later entries under the same name are not reachable through the lookup;
/// they are remembered only so the run can report how many were shadowed.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    entries: HashMap<String, DocPath>,
    shadowed: Vec<(String, DocPath)>,
}

impl Lookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `name` unless it is already taken. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, name: impl Into<String>, dest: DocPath) -> bool {
        let name = name.into();
        if let Some(existing) = self.entries.get(&name) {
            tracing::warn!(
                "'{}' at {} is shadowed by {}",
                name,
                dest,
                existing
            );
            self.shadowed.push((name, dest));
            return false;
        }
        self.entries.insert(name, dest);
        true
    }

    pub fn get(&self, name: &str) -> Option<&DocPath> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn shadowed_count(&self) -> usize {
        self.shadowed.len()
    }

    /// Entries that lost to an earlier one, in insertion order
    pub fn shadowed(&self) -> &[(String, DocPath)] {
        &self.shadowed
    }
}

impl<N: Into<String>> FromIterator<(N, DocPath)> for Lookup {
    fn from_iter<T: IntoIterator<Item = (N, DocPath)>>(iter: T) -> Self {
        let mut lookup = Lookup::new();
        for (name, dest) in iter {
            lookup.insert_if_absent(name, dest);
        }
        lookup
    }
}

/// Output destinations already claimed by a source
///
/// Two sources mapping to one destination would overwrite each other; the
/// first claim keeps it and the later source is dropped with a warning.
#[derive(Debug, Default)]
pub struct DestinationSet {
    claimed: HashSet<DocPath>,
    collisions: usize,
}

impl DestinationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, dest: &DocPath, source: &Path) -> bool {
        if self.claimed.insert(dest.clone()) {
            return true;
        }
        tracing::warn!("{:?} maps to {} which is already taken; skipping it", source, dest);
        self.collisions += 1;
        false
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }
}
