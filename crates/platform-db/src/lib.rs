//! SQLite persistence layer for the agent platform.
//!
//! This crate owns the platform schema (users, agent creators and clients,
//! internet services, base models, customized models and model
//! configurations), the CSV bulk import that resets and reloads it, and the
//! fixed set of queries the CLI exposes.
//!
//! # Example
//!
//! ```no_run
//! use platform_db::{base_model, import, Database, DbConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect(&DbConfig::new("platform.db")).await?;
//!
//!     // Drop, recreate and reload every table from ./data/*.csv
//!     let report = import::reset_and_load(db.pool(), "data".as_ref()).await?;
//!     println!("loaded {} rows", report.total_rows());
//!
//!     for hit in base_model::list_base_models_by_keyword(db.pool(), "gpt").await? {
//!         println!("{} via {}", hit.bmid, hit.provider);
//!     }
//!
//!     db.close().await;
//!     Ok(())
//! }
//! ```

pub mod agent_client;
pub mod base_model;
pub mod config;
pub mod customized_model;
pub mod error;
pub mod import;
pub mod interests;
pub mod internet_service;
pub mod model_configuration;
pub mod models;
pub mod schema;
pub mod validation;

pub use config::DbConfig;
pub use error::{DatabaseError, Result};
pub use import::{ImportReport, TableLoad};
pub use models::{
    BaseModelKeywordMatch, ConfigurationDuration, CustomizedModelCount, InternetService,
    NewAgentClient,
};
pub use schema::SchemaError;
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
///
/// Every CLI invocation opens exactly one connection, so the pool is capped
/// at a single connection.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    const POOL_SIZE: u32 = 1;

    /// Connect using an explicit configuration.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        for option in config.unused_options() {
            tracing::warn!(option, "Ignoring connection option not used by the SQLite store");
        }

        let pool = Self::connect_with(config.connect_options()?).await?;
        tracing::info!("Connected to database: {}", config.url());
        Ok(Self { pool })
    }

    /// Connect to a SQLite URL such as `sqlite::memory:` or `sqlite:data.db`.
    pub async fn connect_url(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = Self::connect_with(options).await?;
        tracing::info!("Connected to database: {}", url);
        Ok(Self { pool })
    }

    async fn connect_with(options: SqliteConnectOptions) -> Result<SqlitePool> {
        let pool = SqlitePoolOptions::new()
            .max_connections(Self::POOL_SIZE)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        Ok(pool)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Statements seeding a small, internally consistent platform.
    ///
    /// Base model 5 has three customized models, 6 has one, 9 has none.
    /// Client 7 owns configurations 1-4 with durations 10, 30, 30, 5.
    const FIXTURE: &[&str] = &[
        "INSERT INTO User (uid, username, email) VALUES
            (1, 'alice', 'alice@example.com'),
            (2, 'bob', 'bob@example.com'),
            (3, 'carol', 'carol@example.com'),
            (7, 'gina', 'gina@example.com')",
        "INSERT INTO AgentCreator (uid, payout_account, bio) VALUES
            (1, 'acct-1', 'vision person'),
            (2, 'acct-2', NULL)",
        "INSERT INTO AgentClient (uid, interests, card_holder_name, expiration_date, card_number, cvv, zip) VALUES
            (3, 'ai;cloud', 'Carol C', '2030-01-31', 4111111111111111, 123, 92617),
            (7, 'gaming', 'Gina G', '2029-06-30', 5500000000000004, 456, 92618)",
        "INSERT INTO Client_Interests (uid, interest) VALUES
            (3, 'ai'), (3, 'cloud'), (7, 'gaming')",
        "INSERT INTO InternetService (sid, endpoint, provider) VALUES
            (10, 'https://api.openai.example/v1', 'OpenAI'),
            (11, 'https://api.anthropic.example/v1', 'Anthropic'),
            (12, 's3://bucket', 'AWS'),
            (13, 'https://llm.nodomain.example', 'Acme')",
        "INSERT INTO LLMService (sid, domain) VALUES
            (10, 'gpt-chat'), (11, 'assistant'), (13, NULL)",
        "INSERT INTO DataStorageService (sid, type) VALUES (12, 'object')",
        "INSERT INTO BaseModel (bmid, uid, description) VALUES
            (5, 1, 'vision'), (6, 1, 'text'), (9, 2, 'speech')",
        "INSERT INTO BaseModelUtilization (bmid, sid, version) VALUES
            (5, 10, 1), (5, 11, 2), (5, 12, 1), (6, 10, 3), (9, 13, 1)",
        "INSERT INTO CustomizedModel (bmid, mid) VALUES
            (5, 50), (5, 51), (5, 52), (6, 60)",
        "INSERT INTO ModelConfiguration (cid, uid, mid, label, content, duration) VALUES
            (1, 7, 50, 'short', 'c1', 10),
            (2, 7, 51, 'long-a', 'c2', 30),
            (3, 7, 60, 'long-b', 'c3', 30),
            (4, 7, 52, 'tiny', 'c4', 5),
            (5, 3, 60, 'carol', NULL, 99)",
    ];

    pub async fn test_db() -> Database {
        let db = Database::connect_url("sqlite::memory:").await.unwrap();
        import::reset_schema(db.pool()).await.unwrap();
        db
    }

    pub async fn seeded_db() -> Database {
        let db = test_db().await;
        for statement in FIXTURE {
            sqlx::query(statement).execute(db.pool()).await.unwrap();
        }
        db
    }

    pub async fn count(pool: &SqlitePool, sql: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(pool)
            .await
            .unwrap()
    }
}
