//! Internet service queries.

use sqlx::SqlitePool;

use crate::models::InternetService;
use crate::Result;

/// List the internet services a base model uses, ordered by `sid`.
pub async fn list_internet_services(pool: &SqlitePool, bmid: i64) -> Result<Vec<InternetService>> {
    let services = sqlx::query_as::<_, InternetService>(
        r#"
        SELECT i.sid, i.endpoint, i.provider
        FROM InternetService i
        JOIN BaseModelUtilization u ON i.sid = u.sid
        WHERE u.bmid = ?
        ORDER BY i.sid ASC
        "#,
    )
    .bind(bmid)
    .fetch_all(pool)
    .await?;

    Ok(services)
}
