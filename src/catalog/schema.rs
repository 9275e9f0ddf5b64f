// Catalog schema
// Downstream readers query `dataset_records` directly, so column names and
// types here are a compatibility surface.

use rusqlite::Connection;

/// Create the catalog table if it does not exist yet. Safe to run on every open.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS dataset_records (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            file_name   TEXT    NOT NULL UNIQUE,
            transcript  TEXT    NOT NULL,
            split_type  TEXT    NOT NULL,
            duration_s  REAL,
            created_at  TEXT    DEFAULT (datetime('now'))
        );
        "#,
    )
}
