//! Metadata catalog: tab-separated play metadata keyed by play index
//!
//! ```text
//! index   title           last_name   first_name  date
//! F_12    Le Menteur      Corneille   Pierre      1644
//! ```
//!
//! The non-digit characters of the first row's index (`F_` above) are the
//! catalog's prefix; a file stem may omit it.

use crate::error::{PlayError, PlayResult};
use crate::play::PlayMetadata;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 5] = ["index", "title", "last_name", "first_name", "date"];

/// One catalog row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub index: String,
    pub title: String,
    pub last_name: String,
    pub first_name: String,
    pub date: String,
}

impl CatalogEntry {
    pub fn to_metadata(&self) -> PlayMetadata {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        PlayMetadata {
            title: non_empty(&self.title),
            author: non_empty(&format!("{} {}", self.first_name.trim(), self.last_name.trim())),
            creation_date: non_empty(&self.date),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    prefix: String,
}

impl Catalog {
    pub fn from_file(path: impl AsRef<Path>) -> PlayResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse a TSV document with a header row; extra columns are ignored
    pub fn parse(content: &str) -> PlayResult<Self> {
        let mut lines = content.lines().filter(|l| !l.trim().is_empty());
        let header: Vec<&str> = lines
            .next()
            .ok_or_else(|| PlayError::data_format("empty catalog"))?
            .split('\t')
            .map(str::trim)
            .collect();

        let mut positions = [0usize; 5];
        for (slot, column) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = header
                .iter()
                .position(|h| *h == column)
                .ok_or_else(|| PlayError::data_format(format!("catalog lacks column '{}'", column)))?;
        }

        let entries = lines
            .enumerate()
            .map(|(row, line)| -> PlayResult<CatalogEntry> {
                let fields: Vec<&str> = line.split('\t').collect();
                let field = |i: usize| -> PlayResult<String> {
                    fields
                        .get(positions[i])
                        .map(|f| f.trim().to_string())
                        .ok_or_else(|| {
                            PlayError::data_format(format!(
                                "catalog row {} has no '{}' field",
                                row + 2,
                                REQUIRED_COLUMNS[i]
                            ))
                        })
                };
                Ok(CatalogEntry {
                    index: field(0)?,
                    title: field(1)?,
                    last_name: field(2)?,
                    first_name: field(3)?,
                    date: field(4)?,
                })
            })
            .collect::<PlayResult<Vec<_>>>()?;

        let prefix: String = entries
            .first()
            .map(|e| e.index.chars().filter(|c| !c.is_ascii_digit()).collect())
            .unwrap_or_default();

        tracing::debug!(entries = entries.len(), %prefix, "catalog loaded");
        Ok(Self { entries, prefix })
    }

    /// Index prefix shared by the catalog's rows
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the row for a play file stem
    ///
    /// Exact index match first, then the stem with the catalog prefix put
    /// in front. A stem carrying another prefix never matches.
    pub fn lookup(&self, stem: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.index == stem).or_else(|| {
            if stem.is_empty() || self.prefix.is_empty() || stem.starts_with(&self.prefix) {
                return None;
            }
            let index = format!("{}{}", self.prefix, stem);
            self.entries.iter().find(|e| e.index == index)
        })
    }

    pub fn metadata_for(&self, stem: &str) -> Option<PlayMetadata> {
        let found = self.lookup(stem).map(CatalogEntry::to_metadata);
        if found.is_none() {
            tracing::warn!(stem, "no catalog entry for play");
        }
        found
    }
}
