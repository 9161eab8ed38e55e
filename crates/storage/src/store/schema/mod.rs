#![forbid(unsafe_code)]

mod sql;

use super::StoreError;
use rusqlite::{Connection, OptionalExtension, params};
use tb_core::profile::SchemaProfile;

const PROFILE_KEY: &str = "schema_profile";

/// Creates whatever the profile needs and is missing. Existing tables are never altered.
///
/// A file created under one profile is refused under another before any table is touched.
/// A file without a profile marker is adopted only when its `tests` columns fit the profile.
pub(super) fn install_schema(conn: &Connection, profile: SchemaProfile) -> Result<(), StoreError> {
    conn.execute_batch(&sql::bootstrap_sql())?;

    match stored_profile(conn)? {
        Some(stored) if stored != profile.as_str() => {
            return Err(StoreError::ProfileMismatch {
                requested: profile,
                stored,
            });
        }
        Some(_) => {}
        None => ensure_adoptable(conn, profile)?,
    }

    let seed_metadata = profile.has_metadata_index() && !table_exists(conn, "metadata")?;
    conn.execute_batch(&sql::profile_schema_sql(profile))?;
    if seed_metadata {
        let seeded = conn.execute(sql::SEED_METADATA, [])?;
        if seeded > 0 {
            tracing::info!(entries = seeded, "metadata index seeded from existing tests");
        }
    }

    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params![PROFILE_KEY, profile.as_str()],
    )?;
    Ok(())
}

fn stored_profile(conn: &Connection) -> Result<Option<String>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT value FROM meta WHERE key = ?1",
            params![PROFILE_KEY],
            |row| row.get(0),
        )
        .optional()?)
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool, StoreError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// An unmarked `tests` table must carry topic and section exactly when the profile is
/// categorized. A missing table is always adoptable.
fn ensure_adoptable(conn: &Connection, profile: SchemaProfile) -> Result<(), StoreError> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('tests')")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    if columns.is_empty() {
        return Ok(());
    }

    let has_column = |name: &str| columns.iter().any(|column| column == name);
    let categorized = has_column("topic") && has_column("section");
    if categorized == profile.is_categorized() {
        return Ok(());
    }

    let found = if categorized {
        SchemaProfile::Categorized
    } else {
        SchemaProfile::Plain
    };
    Err(StoreError::ProfileMismatch {
        requested: profile,
        stored: found.as_str().to_string(),
    })
}
