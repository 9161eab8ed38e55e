#![forbid(unsafe_code)]

use tb_core::profile::SchemaProfile;

const PRAGMAS: &str = r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;
"#;

const META: &str = r#"
        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );
"#;

const TESTS_PLAIN: &str = r#"
        CREATE TABLE IF NOT EXISTS tests (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          question TEXT NOT NULL,
          answer TEXT NOT NULL,
          createdAt DATETIME DEFAULT CURRENT_TIMESTAMP,
          CHECK (question <> '' AND answer <> '')
        );
"#;

const TESTS_CATEGORIZED: &str = r#"
        CREATE TABLE IF NOT EXISTS tests (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          topic TEXT NOT NULL,
          section TEXT NOT NULL,
          question TEXT NOT NULL,
          answer TEXT NOT NULL,
          createdAt DATETIME DEFAULT CURRENT_TIMESTAMP,
          CHECK (question <> '' AND answer <> '')
        );
"#;

const METADATA: &str = r#"
        CREATE TABLE IF NOT EXISTS metadata (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          type TEXT NOT NULL CHECK (type IN ('topic', 'section')),
          value TEXT NOT NULL,
          UNIQUE(type, value)
        );
"#;

/// Backfills an index created next to records that predate it.
pub(super) const SEED_METADATA: &str = r#"
        INSERT OR IGNORE INTO metadata (type, value)
          SELECT 'topic', topic FROM tests
          UNION
          SELECT 'section', section FROM tests
"#;

const INDEXES: &str = r#"
        CREATE INDEX IF NOT EXISTS idx_tests_created_at ON tests(createdAt, id);
"#;

const INDEXES_CATEGORIZED: &str = r#"
        CREATE INDEX IF NOT EXISTS idx_tests_topic_section ON tests(topic, section);
        CREATE INDEX IF NOT EXISTS idx_tests_section ON tests(section);
"#;

pub(super) fn bootstrap_sql() -> String {
    let mut sql = String::new();
    sql.push_str(PRAGMAS);
    sql.push_str(META);
    sql
}

pub(super) fn profile_schema_sql(profile: SchemaProfile) -> String {
    let mut sql = String::new();
    if profile.is_categorized() {
        sql.push_str(TESTS_CATEGORIZED);
    } else {
        sql.push_str(TESTS_PLAIN);
    }
    if profile.has_metadata_index() {
        sql.push_str(METADATA);
    }
    sql.push_str(INDEXES);
    if profile.is_categorized() {
        sql.push_str(INDEXES_CATEGORIZED);
    }
    sql
}
