//! Distribution domain models.
//!
//! A backend produces a flat list of `DistributionFile`s, the delivery policy filters it,
//! and `Manifest::from_files` nests the survivors by path segment. Manifests are built per
//! request and never persisted.

use std::collections::BTreeMap;

use crate::model::license::ManifestEntryDto;

/// One file as emitted by a distribution backend.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionFile {
    /// Path relative to the distribution root, `/` separated.
    pub path: String,
    /// Raw text for tree listings, base64 for binary payloads.
    pub content: String,
}

impl DistributionFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Path segments with empty components removed.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|segment| !segment.is_empty())
    }
}

/// A node of a manifest tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestEntry {
    File(String),
    Directory(Manifest),
}

/// Files eligible for delivery, keyed by path segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// Builds a nested manifest from a flat file list.
    ///
    /// A later file whose path runs through an earlier file's name replaces that file with a
    /// directory.
    pub fn from_files(files: Vec<DistributionFile>) -> Self {
        let mut manifest = Manifest::default();

        for file in files {
            let segments: Vec<String> = file.segments().map(str::to_string).collect();
            if segments.is_empty() {
                continue;
            }
            manifest.insert(&segments, file.content);
        }

        manifest
    }

    fn insert(&mut self, segments: &[String], content: String) {
        let (name, rest) = match segments.split_first() {
            Some(split) => split,
            None => return,
        };

        if rest.is_empty() {
            self.entries
                .insert(name.clone(), ManifestEntry::File(content));
            return;
        }

        let entry = self
            .entries
            .entry(name.clone())
            .or_insert_with(|| ManifestEntry::Directory(Manifest::default()));

        if let ManifestEntry::File(_) = entry {
            *entry = ManifestEntry::Directory(Manifest::default());
        }

        if let ManifestEntry::Directory(child) = entry {
            child.insert(rest, content);
        }
    }

    /// Number of files in the whole tree.
    pub fn file_count(&self) -> usize {
        self.entries
            .values()
            .map(|entry| match entry {
                ManifestEntry::File(_) => 1,
                ManifestEntry::Directory(child) => child.file_count(),
            })
            .sum()
    }

    pub fn into_dto(self) -> BTreeMap<String, ManifestEntryDto> {
        self.entries
            .into_iter()
            .map(|(name, entry)| {
                let dto = match entry {
                    ManifestEntry::File(content) => ManifestEntryDto::File(content),
                    ManifestEntry::Directory(child) => ManifestEntryDto::Directory(child.into_dto()),
                };
                (name, dto)
            })
            .collect()
    }
}

/// The current version of a script together with its filtered manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionRelease {
    pub version: String,
    pub manifest: Manifest,
}

#[cfg(test)]
impl Manifest {
    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.get(name)
    }

    /// Looks an entry up by its full `/` separated path.
    pub fn lookup(&self, path: &str) -> Option<&ManifestEntry> {
        let mut segments = path.split('/').filter(|segment| !segment.is_empty());
        let mut entry = self.entries.get(segments.next()?)?;

        for segment in segments {
            match entry {
                ManifestEntry::Directory(child) => entry = child.entries.get(segment)?,
                ManifestEntry::File(_) => return None,
            }
        }

        Some(entry)
    }
}
