//! Base model operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::BaseModelKeywordMatch;

/// Maximum rows returned by a keyword search.
pub const KEYWORD_MATCH_LIMIT: i64 = 5;

/// Delete a base model.
///
/// Its utilizations and customized models, and the configurations of those
/// customized models, are removed by cascade.
pub async fn delete_base_model(pool: &SqlitePool, bmid: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM BaseModel
        WHERE bmid = ?
        "#,
    )
    .bind(bmid)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "BaseModel",
            id: bmid.to_string(),
        });
    }

    tracing::info!(bmid, "Deleted base model");
    Ok(())
}

/// Find base models served by an LLM service whose domain contains `keyword`.
///
/// The keyword matches literally (LIKE wildcards are escaped). Results are
/// distinct, ordered by `bmid` then `sid`, and capped at
/// [`KEYWORD_MATCH_LIMIT`] rows.
pub async fn list_base_models_by_keyword(
    pool: &SqlitePool,
    keyword: &str,
) -> Result<Vec<BaseModelKeywordMatch>> {
    let rows = sqlx::query_as::<_, BaseModelKeywordMatch>(
        r#"
        SELECT DISTINCT b.bmid, i.sid, i.provider, l.domain
        FROM BaseModel b
        JOIN BaseModelUtilization u ON b.bmid = u.bmid
        JOIN InternetService i ON u.sid = i.sid
        JOIN LLMService l ON i.sid = l.sid
        WHERE l.domain IS NOT NULL
          AND l.domain LIKE ? ESCAPE '\'
        ORDER BY b.bmid ASC, i.sid ASC
        LIMIT ?
        "#,
    )
    .bind(contains_pattern(keyword))
    .bind(KEYWORD_MATCH_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Build a `LIKE` pattern matching any value that contains `keyword`.
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
