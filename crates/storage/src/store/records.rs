#![forbid(unsafe_code)]

use super::{SqliteStore, StoreError};
use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use tb_core::model::{MetadataKind, NewTestRecord, TestFilter, TestRecord};

const SELECT_CATEGORIZED: &str =
    "SELECT id, topic, section, question, answer, createdAt FROM tests";
const SELECT_PLAIN: &str = "SELECT id, NULL, NULL, question, answer, createdAt FROM tests";
const NEWEST_FIRST: &str = "ORDER BY createdAt DESC, id DESC";

impl SqliteStore {
    /// Inserts a record and returns its server-assigned id.
    ///
    /// In the indexed profile the record's topic and section are then upserted into the
    /// metadata index. That second write is best-effort: a failure is logged and the id is
    /// still returned.
    pub fn create_test(&mut self, record: NewTestRecord) -> Result<i64, StoreError> {
        if self.profile.is_categorized() {
            self.conn.execute(
                "INSERT INTO tests (topic, section, question, answer) VALUES (?1, ?2, ?3, ?4)",
                params![record.topic, record.section, record.question, record.answer],
            )?;
        } else {
            self.conn.execute(
                "INSERT INTO tests (question, answer) VALUES (?1, ?2)",
                params![record.question, record.answer],
            )?;
        }
        let id = self.conn.last_insert_rowid();

        if self.profile.has_metadata_index() {
            if let (Some(topic), Some(section)) = (&record.topic, &record.section) {
                if let Err(err) = self.index_values(topic, section) {
                    tracing::warn!(test_id = id, error = %err, "error saving metadata");
                }
            }
        }

        tracing::info!(test_id = id, "test created");
        Ok(id)
    }

    pub fn get_test(&self, id: i64) -> Result<TestRecord, StoreError> {
        let sql = format!("{} WHERE id = ?1", self.select_sql());
        self.conn
            .query_row(&sql, params![id], record_from_row)
            .optional()?
            .ok_or(StoreError::UnknownId)
    }

    /// All records, newest first. Records created within the same second keep insertion order
    /// reversed through the id tie-break.
    pub fn list_tests(&self) -> Result<Vec<TestRecord>, StoreError> {
        let sql = format!("{} {NEWEST_FIRST}", self.select_sql());
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], record_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_filtered_tests(&self, filter: &TestFilter) -> Result<Vec<TestRecord>, StoreError> {
        self.require_categorized()?;

        let mut conditions = Vec::new();
        let mut values = Vec::new();
        if let Some(topic) = filter.topic() {
            conditions.push("topic = ?");
            values.push(topic);
        }
        if let Some(section) = filter.section() {
            conditions.push("section = ?");
            values.push(section);
        }

        let mut sql = self.select_sql().to_string();
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push(' ');
        sql.push_str(NEWEST_FIRST);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), record_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_topics(&self) -> Result<Vec<String>, StoreError> {
        self.require_categorized()?;

        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT topic FROM tests ORDER BY topic")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Distinct sections, restricted to `topic` when one is given and non-empty.
    pub fn list_sections(&self, topic: Option<&str>) -> Result<Vec<String>, StoreError> {
        self.require_categorized()?;

        let topic = topic.filter(|value| !value.is_empty());
        let mut sql = "SELECT DISTINCT section FROM tests".to_string();
        if topic.is_some() {
            sql.push_str(" WHERE topic = ?1");
        }
        sql.push_str(" ORDER BY section");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(topic), |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Removes a record.
    ///
    /// Without a metadata index, "not found" means no row was affected. With the index the
    /// delete runs as an ordered pipeline, each step stopping the sequence on failure:
    /// look the record up, delete it, then release its topic and its section from the index
    /// when no remaining record references them.
    pub fn delete_test(&mut self, id: i64) -> Result<(), StoreError> {
        if !self.profile.has_metadata_index() {
            let deleted = self
                .conn
                .execute("DELETE FROM tests WHERE id = ?1", params![id])?;
            if deleted == 0 {
                return Err(StoreError::UnknownId);
            }
            tracing::info!(test_id = id, "test deleted");
            return Ok(());
        }

        let (topic, section) = self
            .conn
            .query_row(
                "SELECT topic, section FROM tests WHERE id = ?1",
                params![id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?
            .ok_or(StoreError::UnknownId)?;

        self.conn
            .execute("DELETE FROM tests WHERE id = ?1", params![id])?;
        tracing::info!(test_id = id, "test deleted");

        self.release_value(MetadataKind::Topic, &topic)?;
        self.release_value(MetadataKind::Section, &section)?;
        Ok(())
    }

    pub fn count_tests(&self) -> Result<i64, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM tests", [], |row| row.get(0))?)
    }

    fn select_sql(&self) -> &'static str {
        if self.profile.is_categorized() {
            SELECT_CATEGORIZED
        } else {
            SELECT_PLAIN
        }
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<TestRecord> {
    Ok(TestRecord {
        id: row.get(0)?,
        topic: row.get(1)?,
        section: row.get(2)?,
        question: row.get(3)?,
        answer: row.get(4)?,
        created_at: row.get(5)?,
    })
}
