//! Connection configuration.

use std::fmt;
use std::str::FromStr;

use sqlx::sqlite::SqliteConnectOptions;

/// Default database file, relative to the working directory.
pub const DEFAULT_DATABASE: &str = "agent_platform.db";

/// Connection parameters for the platform store.
///
/// The recognized options are `host`, `user`, `password` and `database`.
/// The store is an embedded SQLite file, so only `database` selects where
/// data lives; the server options are kept so configurations written for a
/// networked store still load.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// SQLite file path, or a full `sqlite:` URL.
    pub database: String,
}

impl DbConfig {
    /// Create a configuration for the given database.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            host: None,
            user: None,
            password: None,
            database: database.into(),
        }
    }

    /// Connection URL for the configured database.
    pub fn url(&self) -> String {
        if self.database.starts_with("sqlite:") {
            self.database.clone()
        } else {
            format!("sqlite:{}", self.database)
        }
    }

    /// Server options that the SQLite store does not use.
    pub fn unused_options(&self) -> Vec<&'static str> {
        let mut unused = Vec::new();
        if self.host.is_some() {
            unused.push("host");
        }
        if self.user.is_some() {
            unused.push("user");
        }
        if self.password.is_some() {
            unused.push("password");
        }
        unused
    }

    /// Build SQLite connect options with foreign keys enforced.
    pub fn connect_options(&self) -> Result<SqliteConnectOptions, sqlx::Error> {
        let options = if self.database.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(&self.database)?
        } else {
            SqliteConnectOptions::new().filename(&self.database)
        };

        Ok(options.create_if_missing(true).foreign_keys(true))
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE)
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .finish()
    }
}
