//! Agent client registration.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::interests::parse_interests;
use crate::models::NewAgentClient;
use crate::schema::{AGENT_CLIENT, CLIENT_INTERESTS, USER};
use crate::validation::validate_column_length;

/// Register an agent client.
///
/// Writes the `User` row, the `AgentClient` row and one `Client_Interests`
/// row per parsed interest in a single transaction. A `User` row that
/// already exists under the same uid is kept as is.
pub async fn insert_agent_client(pool: &SqlitePool, client: &NewAgentClient) -> Result<()> {
    validate_column_length(&USER, "username", &client.username)?;
    validate_column_length(&USER, "email", &client.email)?;
    validate_column_length(&AGENT_CLIENT, "card_holder_name", &client.card_holder_name)?;

    let interests = parse_interests(&client.interests);
    for interest in &interests {
        validate_column_length(&CLIENT_INTERESTS, "interest", interest)?;
    }

    let id = client.uid.to_string();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO User (uid, username, email)
        VALUES (?, ?, ?)
        ON CONFLICT (uid) DO NOTHING
        "#,
    )
    .bind(client.uid)
    .bind(&client.username)
    .bind(&client.email)
    .execute(&mut *tx)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "User", id.clone()))?;

    sqlx::query(
        r#"
        INSERT INTO AgentClient
            (uid, interests, card_holder_name, expiration_date, card_number, cvv, zip)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(client.uid)
    .bind(&client.interests)
    .bind(&client.card_holder_name)
    .bind(client.expiration_date)
    .bind(client.card_number)
    .bind(client.cvv)
    .bind(client.zip)
    .execute(&mut *tx)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "AgentClient", id.clone()))?;

    for interest in &interests {
        sqlx::query(
            r#"
            INSERT INTO Client_Interests (uid, interest)
            VALUES (?, ?)
            "#,
        )
        .bind(client.uid)
        .bind(interest)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from_insert(e, "Client_Interests", format!("{}/{}", id, interest)))?;
    }

    tx.commit().await?;

    tracing::info!(
        uid = client.uid,
        interests = interests.len(),
        "Registered agent client"
    );
    Ok(())
}

/// List the normalized interests stored for a client.
pub async fn list_client_interests(pool: &SqlitePool, uid: i64) -> Result<Vec<String>> {
    let interests = sqlx::query_scalar::<_, String>(
        r#"
        SELECT interest
        FROM Client_Interests
        WHERE uid = ?
        ORDER BY interest
        "#,
    )
    .bind(uid)
    .fetch_all(pool)
    .await?;

    Ok(interests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{count, seeded_db, test_db};
    use crate::validation::ValidationError;
    use chrono::NaiveDate;

    fn client(uid: i64, email: &str, interests: &str) -> NewAgentClient {
        NewAgentClient {
            uid,
            username: format!("user{}", uid),
            email: email.to_string(),
            card_number: 4111111111111111,
            card_holder_name: "Test Holder".to_string(),
            expiration_date: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
            cvv: 123,
            zip: 92617,
            interests: interests.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_splits_interests() {
        let db = test_db().await;
        insert_agent_client(db.pool(), &client(20, "u20@example.com", "ai, security;cloud"))
            .await
            .unwrap();

        let interests = list_client_interests(db.pool(), 20).await.unwrap();
        assert_eq!(interests, vec!["ai", "cloud", "security"]);

        let stored: String = sqlx::query_scalar("SELECT interests FROM AgentClient WHERE uid = 20")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(stored, "ai, security;cloud");

        let date: String =
            sqlx::query_scalar("SELECT expiration_date FROM AgentClient WHERE uid = 20")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(date, "2030-12-31");
    }

    #[tokio::test]
    async fn test_existing_user_is_tolerated() {
        let db = seeded_db().await;
        // uid 1 is already a User (and a creator), but not a client.
        insert_agent_client(db.pool(), &client(1, "other@example.com", "x"))
            .await
            .unwrap();

        let email: String = sqlx::query_scalar("SELECT email FROM User WHERE uid = 1")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(email, "alice@example.com");
        assert_eq!(count(db.pool(), "SELECT COUNT(*) FROM AgentClient WHERE uid = 1").await, 1);
    }

    #[tokio::test]
    async fn test_existing_client_fails_and_rolls_back() {
        let db = seeded_db().await;
        let err = insert_agent_client(db.pool(), &client(3, "carol.new@example.com", "new"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::AlreadyExists { entity: "AgentClient", .. }));

        let interests = list_client_interests(db.pool(), 3).await.unwrap();
        assert_eq!(interests, vec!["ai", "cloud"]);
    }

    #[tokio::test]
    async fn test_duplicate_email_on_new_uid_fails() {
        let db = seeded_db().await;
        let err = insert_agent_client(db.pool(), &client(30, "alice@example.com", "ai"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::AlreadyExists { entity: "User", .. }));
        assert_eq!(count(db.pool(), "SELECT COUNT(*) FROM User WHERE uid = 30").await, 0);
    }

    #[tokio::test]
    async fn test_email_stored_as_given() {
        let db = test_db().await;
        insert_agent_client(db.pool(), &client(24, "zoe", "ai"))
            .await
            .unwrap();

        let email: String = sqlx::query_scalar("SELECT email FROM User WHERE uid = 24")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(email, "zoe");
    }

    #[tokio::test]
    async fn test_repeated_interests_do_not_fail() {
        let db = test_db().await;
        insert_agent_client(db.pool(), &client(21, "u21@example.com", "ai;ai, ai"))
            .await
            .unwrap();
        assert_eq!(list_client_interests(db.pool(), 21).await.unwrap(), vec!["ai"]);
    }

    #[tokio::test]
    async fn test_blank_interests_write_no_rows() {
        let db = test_db().await;
        insert_agent_client(db.pool(), &client(22, "u22@example.com", " ; , "))
            .await
            .unwrap();
        assert!(list_client_interests(db.pool(), 22).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overlong_interest_rejected_before_writing() {
        let db = test_db().await;
        let long = "z".repeat(300);
        let err = insert_agent_client(db.pool(), &client(23, "u23@example.com", &long))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::Validation(ValidationError::TooLong { .. })
        ));
        assert_eq!(count(db.pool(), "SELECT COUNT(*) FROM User").await, 0);
    }
}
