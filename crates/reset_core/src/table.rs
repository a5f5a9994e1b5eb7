use std::collections::btree_map;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use thiserror::Error;

use crate::record::Record;
use crate::scanner::ScannedStore;

/// Old identifier to new identifier, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapTable {
    entries: BTreeMap<String, String>,
}

impl RemapTable {
    pub fn get(&self, old_id: &str) -> Option<&str> {
        self.entries.get(old_id).map(String::as_str)
    }

    pub fn contains_old(&self, old_id: &str) -> bool {
        self.entries.contains_key(old_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, old_id: &str, new_id: &str) {
        self.entries.insert(old_id.to_string(), new_id.to_string());
    }
}

impl<'a> IntoIterator for &'a RemapTable {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(String, String)> for RemapTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// The global table plus the subset that came from the scene store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapTables {
    pub global: RemapTable,
    pub scenes: RemapTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKind {
    /// The existing identifier was already mapped by an earlier document.
    OldId,
    /// The existing identifier equals a replacement issued earlier.
    OldMatchesNew,
    /// The replacement identifier is already used as an old or new id.
    NewId,
}

impl DuplicateKind {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::OldId => "old_id",
            Self::OldMatchesNew => "old_id_matches_new_id",
            Self::NewId => "new_id",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateId {
    pub kind: DuplicateKind,
    pub id: String,
    pub file: String,
    pub name: Option<String>,
}

impl fmt::Display for DuplicateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} in {}", self.kind.as_str(), self.id, self.file)?;
        if let Some(name) = &self.name {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}

/// Every duplicate found while building the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate IDs found: {}", format_duplicates(.0))]
pub struct DuplicateIds(pub Vec<DuplicateId>);

fn format_duplicates(duplicates: &[DuplicateId]) -> String {
    duplicates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates records from every database file into one [`RemapTable`].
///
/// Duplicates do not stop the build; they are collected and reported
/// together by [`RemapTableBuilder::finish`].
#[derive(Debug)]
pub struct RemapTableBuilder {
    scene_store: String,
    tables: RemapTables,
    new_ids: HashSet<String>,
    duplicates: Vec<DuplicateId>,
}

impl RemapTableBuilder {
    pub fn new(scene_store: impl Into<String>) -> Self {
        Self {
            scene_store: scene_store.into(),
            tables: RemapTables::default(),
            new_ids: HashSet::new(),
            duplicates: Vec::new(),
        }
    }

    pub fn add_store(&mut self, store: &ScannedStore) {
        for record in &store.records {
            self.add(&store.file_name, record);
        }
    }

    pub fn add(&mut self, file: &str, record: &Record) {
        let mut clean = true;

        if self.tables.global.contains_old(&record.old_id) {
            self.report(DuplicateKind::OldId, &record.old_id, file, record);
            clean = false;
        } else if self.new_ids.contains(&record.old_id) {
            self.report(DuplicateKind::OldMatchesNew, &record.old_id, file, record);
            clean = false;
        }

        if self.new_ids.contains(&record.new_id) || self.tables.global.contains_old(&record.new_id)
        {
            self.report(DuplicateKind::NewId, &record.new_id, file, record);
            clean = false;
        }

        if !clean {
            return;
        }

        self.tables.global.insert(&record.old_id, &record.new_id);
        self.new_ids.insert(record.new_id.clone());
        if file == self.scene_store {
            self.tables.scenes.insert(&record.old_id, &record.new_id);
        }
    }

    pub fn duplicates(&self) -> &[DuplicateId] {
        &self.duplicates
    }

    pub fn finish(self) -> Result<RemapTables, DuplicateIds> {
        if self.duplicates.is_empty() {
            Ok(self.tables)
        } else {
            Err(DuplicateIds(self.duplicates))
        }
    }

    fn report(&mut self, kind: DuplicateKind, id: &str, file: &str, record: &Record) {
        tracing::error!(
            file = %file,
            name = %record.display_name(),
            kind = kind.as_str(),
            id = %id,
            "Duplicate ID found."
        );
        self.duplicates.push(DuplicateId {
            kind,
            id: id.to_string(),
            file: file.to_string(),
            name: record.name.clone(),
        });
    }
}
