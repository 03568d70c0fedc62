//! Model configuration queries.

use sqlx::SqlitePool;

use crate::models::ConfigurationDuration;
use crate::Result;

/// Get a client's `n` longest-running configurations.
///
/// Ordered by duration (longest first), ties broken by ascending `cid`.
/// A non-positive `n` yields no rows.
pub async fn top_n_duration_configs(
    pool: &SqlitePool,
    uid: i64,
    n: i64,
) -> Result<Vec<ConfigurationDuration>> {
    // SQLite reads a negative LIMIT as "no limit".
    if n <= 0 {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, ConfigurationDuration>(
        r#"
        SELECT uid, cid, label, content, duration
        FROM ModelConfiguration
        WHERE uid = ?
        ORDER BY duration DESC, cid ASC
        LIMIT ?
        "#,
    )
    .bind(uid)
    .bind(n)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
