#![forbid(unsafe_code)]

use super::{SqliteStore, StoreError};
use rusqlite::params;
use std::collections::BTreeSet;
use tb_core::model::{MetadataKind, MetadataSnapshot};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct MetadataEntryRow {
    pub kind: MetadataKind,
    pub value: String,
}

/// Difference between the metadata index and the distinct topic/section projection of the
/// live records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataAudit {
    /// Referenced by at least one record but absent from the index.
    pub missing: Vec<MetadataEntryRow>,
    /// Present in the index but referenced by no record.
    pub stale: Vec<MetadataEntryRow>,
}

impl MetadataAudit {
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty() && self.stale.is_empty()
    }
}

impl SqliteStore {
    /// Topics and sections from the index, each list in lexicographic order.
    pub fn metadata(&self) -> Result<MetadataSnapshot, StoreError> {
        self.require_metadata_index()?;

        let mut stmt = self
            .conn
            .prepare("SELECT type, value FROM metadata ORDER BY type, value")?;
        let mut rows = stmt.query([])?;
        let mut snapshot = MetadataSnapshot::default();
        while let Some(row) = rows.next()? {
            let kind: String = row.get(0)?;
            let value: String = row.get(1)?;
            match MetadataKind::parse(&kind) {
                Some(MetadataKind::Topic) => snapshot.topics.push(value),
                Some(MetadataKind::Section) => snapshot.sections.push(value),
                None => continue,
            }
        }
        Ok(snapshot)
    }

    pub fn audit_metadata(&self) -> Result<MetadataAudit, StoreError> {
        self.require_metadata_index()?;

        let expected = self.collect_entries(
            "SELECT 'topic', topic FROM tests UNION SELECT 'section', section FROM tests",
        )?;
        let actual = self.collect_entries("SELECT type, value FROM metadata")?;

        Ok(MetadataAudit {
            missing: expected.difference(&actual).cloned().collect(),
            stale: actual.difference(&expected).cloned().collect(),
        })
    }

    pub(super) fn index_values(&self, topic: &str, section: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO metadata (type, value) VALUES (?1, ?2), (?3, ?4)",
            params![
                MetadataKind::Topic.as_str(),
                topic,
                MetadataKind::Section.as_str(),
                section
            ],
        )?;
        Ok(())
    }

    /// Drops the index entry for `value` once no record references it any more.
    pub(super) fn release_value(&self, kind: MetadataKind, value: &str) -> Result<(), StoreError> {
        // The column name comes from a closed enum, never from input.
        let sql = format!("SELECT COUNT(*) FROM tests WHERE {} = ?1", kind.as_str());
        let remaining: i64 = self.conn.query_row(&sql, params![value], |row| row.get(0))?;
        if remaining > 0 {
            return Ok(());
        }

        self.conn.execute(
            "DELETE FROM metadata WHERE type = ?1 AND value = ?2",
            params![kind.as_str(), value],
        )?;
        tracing::debug!(kind = kind.as_str(), value, "metadata entry released");
        Ok(())
    }

    fn collect_entries(&self, sql: &str) -> Result<BTreeSet<MetadataEntryRow>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut entries = BTreeSet::new();
        while let Some(row) = rows.next()? {
            let kind: String = row.get(0)?;
            let value: String = row.get(1)?;
            let Some(kind) = MetadataKind::parse(&kind) else {
                tracing::warn!(kind = %kind, value = %value, "skipping metadata entry of unknown type");
                continue;
            };
            entries.insert(MetadataEntryRow { kind, value });
        }
        Ok(entries)
    }
}
