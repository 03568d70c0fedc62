//! Schema reset and CSV bulk import.
//!
//! A reset drops every platform table (children first) and recreates it
//! (parents first). An import performs the reset and then loads
//! `<dir>/<Table>.csv` for each table, all inside one transaction: either the
//! whole import lands or the store is left exactly as it was.

use std::path::Path;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DatabaseError, Result};
use crate::schema::{creation_order, drop_order, Table, PLATFORM_TABLES};

/// Field values loaded as SQL NULL.
pub const NULL_TOKEN: &str = "NULL";

/// Rows loaded into one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLoad {
    pub table: &'static str,
    /// `None` when the table had no CSV file (or an empty one).
    pub rows: Option<u64>,
}

/// Outcome of a successful import, in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub tables: Vec<TableLoad>,
}

impl ImportReport {
    /// Total rows inserted across all tables.
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().filter_map(|t| t.rows).sum()
    }

    /// Rows loaded into `table`, if its file was present.
    pub fn rows_for(&self, table: &str) -> Option<u64> {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .and_then(|t| t.rows)
    }
}

/// Map a raw CSV field to the value bound for it.
pub fn normalize_field(field: &str) -> Option<&str> {
    if field.is_empty() || field == NULL_TOKEN {
        None
    } else {
        Some(field)
    }
}

/// Drop and recreate every platform table, leaving them empty.
pub async fn reset_schema(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;
    defer_foreign_keys(&mut *tx).await?;
    reset_tables(&mut *tx, PLATFORM_TABLES).await?;
    tx.commit().await?;

    info!("Schema reset ({} tables)", PLATFORM_TABLES.len());
    Ok(())
}

/// Reset the schema and load every table's CSV file from `dir`.
///
/// Missing per-table files are skipped, so a missing `dir` leaves every
/// table empty. Fields equal to `NULL` or empty are loaded as SQL NULL. Any
/// error rolls the whole import back.
pub async fn reset_and_load(pool: &SqlitePool, dir: &Path) -> Result<ImportReport> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "Import folder not found, tables will be empty");
    }

    let mut tx = pool.begin().await?;
    defer_foreign_keys(&mut *tx).await?;
    reset_tables(&mut *tx, PLATFORM_TABLES).await?;

    let mut report = ImportReport::default();
    for table in creation_order(PLATFORM_TABLES)? {
        let path = dir.join(table.csv_file_name());
        let rows = load_table(&mut *tx, table, &path).await?;
        report.tables.push(TableLoad {
            table: table.name,
            rows,
        });
    }

    tx.commit().await?;

    info!(
        dir = %dir.display(),
        rows = report.total_rows(),
        "Import complete"
    );
    Ok(report)
}

/// Postpone foreign-key checks to commit time for the current transaction.
async fn defer_foreign_keys(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query("PRAGMA defer_foreign_keys = ON")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn reset_tables(conn: &mut SqliteConnection, tables: &[Table]) -> Result<()> {
    for table in drop_order(tables)? {
        sqlx::query(&table.drop_sql()).execute(&mut *conn).await?;
    }

    for table in creation_order(tables)? {
        sqlx::query(&table.create_sql()).execute(&mut *conn).await?;
        debug!(table = table.name, "Created table");
    }

    Ok(())
}

/// Load one CSV file into `table`. Returns `None` when there was nothing to load.
async fn load_table(conn: &mut SqliteConnection, table: &Table, path: &Path) -> Result<Option<u64>> {
    if !path.is_file() {
        debug!(table = table.name, path = %path.display(), "No CSV file, skipping");
        return Ok(None);
    }

    let csv_err = |source: csv::Error| DatabaseError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let header = reader.headers().map_err(csv_err)?.clone();
    if header.is_empty() {
        debug!(table = table.name, "Empty CSV file, skipping");
        return Ok(None);
    }

    let mut columns: Vec<&'static str> = Vec::with_capacity(header.len());
    for raw in header.iter() {
        let name = raw.trim_start_matches('\u{feff}').trim();
        let column = table
            .column(name)
            .ok_or_else(|| DatabaseError::UnknownColumn {
                table: table.name,
                column: name.to_string(),
            })?;
        columns.push(column.name);
    }

    let insert_sql = table.insert_sql(&columns);
    let mut rows = 0u64;

    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let line = record.position().map_or(0, |p| p.line());

        if record.len() != columns.len() {
            return Err(DatabaseError::RowWidth {
                table: table.name,
                line,
                expected: columns.len(),
                actual: record.len(),
            });
        }

        let mut query = sqlx::query(&insert_sql);
        for field in record.iter() {
            query = query.bind(normalize_field(field).map(str::to_string));
        }

        query.execute(&mut *conn).await.map_err(|e| {
            debug!(table = table.name, line, error = %e, "Row rejected");
            DatabaseError::Sqlx(e)
        })?;
        rows += 1;
    }

    debug!(table = table.name, rows, "Loaded table");
    Ok(Some(rows))
}
