//! Connection configuration loaded from environment variables.

use std::env;

use platform_db::config::DEFAULT_DATABASE;
use platform_db::DbConfig;

use crate::cli::ConnectionArgs;

/// Resolve connection parameters.
///
/// Flags win over environment variables:
///
/// | Variable | Flag | Default |
/// |----------|------|---------|
/// | `PLATFORM_DB_HOST` | `--host` | (unset) |
/// | `PLATFORM_DB_USER` | `--user` | (unset) |
/// | `PLATFORM_DB_PASSWORD` | `--password` | (unset) |
/// | `PLATFORM_DB_DATABASE` | `--database` | `agent_platform.db` |
pub fn resolve(args: &ConnectionArgs) -> Result<DbConfig, ConfigError> {
    resolve_with(args, |key| env::var(key).ok())
}

fn resolve_with(
    args: &ConnectionArgs,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<DbConfig, ConfigError> {
    let pick = |flag: &Option<String>, key: &str| flag.clone().or_else(|| lookup(key));

    let database = pick(&args.database, "PLATFORM_DB_DATABASE")
        .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
    if database.trim().is_empty() {
        return Err(ConfigError::EmptyDatabase);
    }

    Ok(DbConfig {
        host: pick(&args.host, "PLATFORM_DB_HOST"),
        user: pick(&args.user, "PLATFORM_DB_USER"),
        password: pick(&args.password, "PLATFORM_DB_PASSWORD"),
        database,
    })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("database must not be empty (PLATFORM_DB_DATABASE or --database)")]
    EmptyDatabase,
}
