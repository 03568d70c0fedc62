//! Customized model operations.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::CustomizedModelCount;

/// Derive a new customized model from an existing base model.
pub async fn add_customized_model(pool: &SqlitePool, mid: i64, bmid: i64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO CustomizedModel (mid, bmid)
        VALUES (?, ?)
        "#,
    )
    .bind(mid)
    .bind(bmid)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "CustomizedModel", mid.to_string()))?;

    tracing::info!(mid, bmid, "Added customized model");
    Ok(())
}

/// Count customized models for each requested base model.
///
/// Base models without customizations count 0. Ids that do not name a base
/// model produce no row. Rows are ordered by `bmid`.
pub async fn count_customized_models(
    pool: &SqlitePool,
    bmids: &[i64],
) -> Result<Vec<CustomizedModelCount>> {
    if bmids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT b.bmid, b.description, COUNT(c.mid) AS customized_model_count
        FROM BaseModel b
        LEFT JOIN CustomizedModel c ON b.bmid = c.bmid
        WHERE b.bmid IN ("#,
    );
    let mut ids = builder.separated(", ");
    for bmid in bmids {
        ids.push_bind(*bmid);
    }
    ids.push_unseparated(
        r#")
        GROUP BY b.bmid, b.description
        ORDER BY b.bmid ASC
        "#,
    );

    let rows = builder
        .build_query_as::<CustomizedModelCount>()
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
