//! End-to-end import tests against the CSV fixtures in `tests/fixtures`.

use std::path::PathBuf;

use platform_db::schema::{quote_ident, Table, PLATFORM_TABLES};
use platform_db::{
    base_model, customized_model, import, internet_service, model_configuration, Database,
};

type Snapshot = Vec<(&'static str, Vec<Vec<Option<String>>>)>;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

async fn memory_db() -> Database {
    Database::connect_url("sqlite::memory:").await.unwrap()
}

/// Every row of `table` as text, in insertion order.
async fn table_rows(db: &Database, table: &Table) -> Vec<Vec<Option<String>>> {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("CAST({} AS TEXT)", quote_ident(c.name)))
        .collect();
    let sql = format!(
        "SELECT {} FROM {} ORDER BY rowid",
        columns.join(", "),
        quote_ident(table.name)
    );

    let rows = sqlx::query(&sql).fetch_all(db.pool()).await.unwrap();
    rows.iter()
        .map(|row| {
            use sqlx::Row;
            (0..table.columns.len())
                .map(|i| row.try_get::<Option<String>, _>(i).unwrap())
                .collect()
        })
        .collect()
}

async fn snapshot(db: &Database) -> Snapshot {
    let mut out = Vec::new();
    for table in PLATFORM_TABLES {
        out.push((table.name, table_rows(db, table).await));
    }
    out
}

/// Rows of a fixture CSV, re-ordered into the table's declared column order.
fn expected_rows(table: &Table) -> Vec<Vec<Option<String>>> {
    let path = fixtures().join(table.csv_file_name());
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header: Vec<String> = reader
        .headers()
        .unwrap()
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    reader
        .records()
        .map(|record| {
            let record = record.unwrap();
            table
                .columns
                .iter()
                .map(|col| {
                    let i = header.iter().position(|h| h == col.name)?;
                    import::normalize_field(&record[i]).map(str::to_string)
                })
                .collect()
        })
        .collect()
}

#[tokio::test]
async fn test_import_round_trips_every_row() {
    let db = memory_db().await;
    let report = import::reset_and_load(db.pool(), &fixtures()).await.unwrap();
    assert_eq!(report.total_rows(), 31);
    assert_eq!(report.tables.len(), PLATFORM_TABLES.len());

    for table in PLATFORM_TABLES {
        assert_eq!(
            table_rows(&db, table).await,
            expected_rows(table),
            "table {}",
            table.name
        );
    }
}

#[tokio::test]
async fn test_import_is_idempotent() {
    let db = memory_db().await;
    import::reset_and_load(db.pool(), &fixtures()).await.unwrap();
    let first = snapshot(&db).await;

    import::reset_and_load(db.pool(), &fixtures()).await.unwrap();
    let second = snapshot(&db).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_import_replaces_mutated_state() {
    let db = memory_db().await;
    import::reset_and_load(db.pool(), &fixtures()).await.unwrap();
    let pristine = snapshot(&db).await;

    customized_model::add_customized_model(db.pool(), 99, 9).await.unwrap();
    base_model::delete_base_model(db.pool(), 5).await.unwrap();
    assert_ne!(snapshot(&db).await, pristine);

    import::reset_and_load(db.pool(), &fixtures()).await.unwrap();
    assert_eq!(snapshot(&db).await, pristine);
}

#[tokio::test]
async fn test_queries_over_imported_data() {
    let db = memory_db().await;
    import::reset_and_load(db.pool(), &fixtures()).await.unwrap();
    let pool = db.pool();

    let services = internet_service::list_internet_services(pool, 5).await.unwrap();
    assert_eq!(services.iter().map(|s| s.sid).collect::<Vec<_>>(), vec![10, 11]);

    let counts = customized_model::count_customized_models(pool, &[5, 9]).await.unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].customized_model_count, 3);
    assert_eq!(counts[1].customized_model_count, 0);

    let top = model_configuration::top_n_duration_configs(pool, 7, 2).await.unwrap();
    assert_eq!(top.iter().map(|c| c.cid).collect::<Vec<_>>(), vec![2, 3]);

    // LLMService 11 has a NULL domain and must never match.
    let hits = base_model::list_base_models_by_keyword(pool, "").await.unwrap();
    assert!(hits.iter().all(|h| h.sid == 10));
    assert_eq!(hits.iter().map(|h| h.bmid).collect::<Vec<_>>(), vec![5, 6]);

    // Base model 6 was loaded with an empty description.
    let counts = customized_model::count_customized_models(pool, &[6]).await.unwrap();
    assert_eq!(counts[0].description, None);
}

#[tokio::test]
async fn test_cascade_after_import() {
    let db = memory_db().await;
    import::reset_and_load(db.pool(), &fixtures()).await.unwrap();

    base_model::delete_base_model(db.pool(), 5).await.unwrap();

    let configs: Vec<i64> = sqlx::query_scalar("SELECT cid FROM ModelConfiguration ORDER BY cid")
        .fetch_all(db.pool())
        .await
        .unwrap();
    assert_eq!(configs, vec![3]);

    let mids: Vec<i64> = sqlx::query_scalar("SELECT mid FROM CustomizedModel ORDER BY mid")
        .fetch_all(db.pool())
        .await
        .unwrap();
    assert_eq!(mids, vec![60]);
}
