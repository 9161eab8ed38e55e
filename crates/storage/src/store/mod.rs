#![forbid(unsafe_code)]

mod error;
mod metadata;
mod records;
mod schema;

pub use error::StoreError;
pub use metadata::{MetadataAudit, MetadataEntryRow};

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tb_core::profile::SchemaProfile;

/// Single-connection SQLite store for test records.
///
/// Opening the store runs the schema manager; every other operation assumes the tables of
/// `profile` exist.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    db_path: PathBuf,
    profile: SchemaProfile,
}

impl SqliteStore {
    pub fn open(db_path: impl AsRef<Path>, profile: SchemaProfile) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        schema::install_schema(&conn, profile)?;

        tracing::debug!(db = %db_path.display(), %profile, "schema ready");
        Ok(Self {
            conn,
            db_path,
            profile,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn profile(&self) -> SchemaProfile {
        self.profile
    }

    fn require_categorized(&self) -> Result<(), StoreError> {
        if self.profile.is_categorized() {
            Ok(())
        } else {
            Err(StoreError::InvalidInput(
                "topic and section require a categorized profile",
            ))
        }
    }

    fn require_metadata_index(&self) -> Result<(), StoreError> {
        if self.profile.has_metadata_index() {
            Ok(())
        } else {
            Err(StoreError::InvalidInput(
                "metadata index requires the indexed profile",
            ))
        }
    }
}
