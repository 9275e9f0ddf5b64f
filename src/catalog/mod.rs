//! Durable catalog of ingested records (SQLite).
//!
//! Append-only: rows are inserted once per file name and never updated or
//! deleted here. The unique `file_name` column is the idempotence key, so
//! recording the same file twice is a no-op reported as [`RecordOutcome::Skipped`].

pub mod schema;

use crate::audio::FileDescriptor;
use crate::error::{IngestError, Result};
use crate::split::Split;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::fs;
use std::path::{Path, PathBuf};

const INSERT_OR_IGNORE: &str = r#"
    INSERT OR IGNORE INTO dataset_records
        (file_name, transcript, split_type, duration_s)
    VALUES (?1, ?2, ?3, ?4)
"#;

/// Result of recording one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new row was inserted.
    Written,
    /// A row with this file name already existed.
    Skipped,
}

/// One catalog row as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub id: i64,
    pub file_name: String,
    pub transcript: String,
    pub split: Split,
    pub duration_seconds: Option<f64>,
    pub created_at: Option<String>,
}

/// Owner of the catalog database connection.
pub struct Catalog {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Catalog {
    /// Open (creating if needed) the catalog at `path` and ensure its schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let catalog = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        catalog.ensure_schema()?;

        log::info!("Catalog opened at {}", path.display());
        Ok(catalog)
    }

    /// Catalog that lives only as long as this value.
    pub fn open_in_memory() -> Result<Self> {
        let catalog = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        catalog.ensure_schema()?;
        Ok(catalog)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create the table if absent.
    pub fn ensure_schema(&self) -> Result<()> {
        schema::ensure_schema(&self.conn)?;
        Ok(())
    }

    /// Record one descriptor in its own implicit transaction.
    pub fn record(&self, descriptor: &FileDescriptor) -> Result<RecordOutcome> {
        insert_or_ignore(&self.conn, descriptor)
    }

    /// Start a batch whose inserts become durable together on [`CatalogBatch::commit`].
    pub fn batch(&mut self) -> Result<CatalogBatch<'_>> {
        Ok(CatalogBatch {
            tx: self.conn.transaction()?,
        })
    }

    /// Total number of rows.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM dataset_records", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn count_by_split(&self, split: Split) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM dataset_records WHERE split_type = ?1",
            params![split.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// All file names in insertion order.
    pub fn file_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT file_name FROM dataset_records ORDER BY id")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    pub fn get(&self, file_name: &str) -> Result<Option<CatalogRow>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, file_name, transcript, split_type, duration_s, created_at
                FROM dataset_records WHERE file_name = ?1
                "#,
                params![file_name],
                |row| {
                    let split: String = row.get(3)?;
                    let split = split.parse::<Split>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
                    })?;
                    Ok(CatalogRow {
                        id: row.get(0)?,
                        file_name: row.get(1)?,
                        transcript: row.get(2)?,
                        split,
                        duration_seconds: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }
}

/// Inserts of one split, committed together.
///
/// Dropping a batch without committing rolls its inserts back.
pub struct CatalogBatch<'c> {
    tx: Transaction<'c>,
}

impl CatalogBatch<'_> {
    pub fn record(&self, descriptor: &FileDescriptor) -> Result<RecordOutcome> {
        insert_or_ignore(&self.tx, descriptor)
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit().map_err(IngestError::from)
    }
}

fn insert_or_ignore(conn: &Connection, descriptor: &FileDescriptor) -> Result<RecordOutcome> {
    let mut stmt = conn.prepare_cached(INSERT_OR_IGNORE)?;
    let inserted = stmt.execute(params![
        descriptor.file_name,
        descriptor.transcript,
        descriptor.split.as_str(),
        descriptor.duration_seconds,
    ])?;
    Ok(if inserted == 1 {
        RecordOutcome::Written
    } else {
        RecordOutcome::Skipped
    })
}
