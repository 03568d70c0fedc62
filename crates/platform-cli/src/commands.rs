//! Runs one command and renders its outcome.
//!
//! Write commands print exactly `Success` or `Fail`. Read commands print
//! zero or more CSV lines and print nothing when they fail. Store errors are
//! only ever logged, at `warn`.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use platform_db::{
    agent_client, base_model, customized_model, import, internet_service, model_configuration,
    Database, DbConfig, NewAgentClient,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cli::{Command, StoreCommand};

/// Result token printed by write commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Fail,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "Success"),
            Outcome::Fail => write!(f, "Fail"),
        }
    }
}

/// Run `command` against the configured database, writing its output to `out`.
///
/// Only I/O errors on `out` are returned.
pub async fn execute<W: Write>(command: Command, config: &DbConfig, out: &mut W) -> io::Result<()> {
    match command {
        Command::Store(command) => execute_store(command, config, out).await,
        Command::PrintNl2sqlResult { path } => print_nl2sql_result(&path, out),
    }
}

async fn execute_store<W: Write>(
    command: StoreCommand,
    config: &DbConfig,
    out: &mut W,
) -> io::Result<()> {
    let db = match Database::connect(config).await {
        Ok(db) => db,
        Err(e) => {
            warn!(command = command.name(), error = %e, "Could not connect");
            if command.is_write() {
                writeln!(out, "{}", Outcome::Fail)?;
            }
            return Ok(());
        }
    };

    let result = run(command, &db, out).await;
    db.close().await;
    result
}

async fn run<W: Write>(command: StoreCommand, db: &Database, out: &mut W) -> io::Result<()> {
    let pool = db.pool();
    let name = command.name();

    match command {
        StoreCommand::Import { folder } => {
            let result = import::reset_and_load(pool, &folder).await;
            if let Ok(report) = &result {
                for table in &report.tables {
                    debug!(table = table.table, rows = ?table.rows, "Imported");
                }
            }
            report_outcome(out, name, result)
        }
        StoreCommand::InsertAgentClient(args) => {
            let client = NewAgentClient::from(args);
            let result = agent_client::insert_agent_client(pool, &client).await;
            report_outcome(out, name, result)
        }
        StoreCommand::AddCustomizedModel { mid, bmid } => {
            let result = customized_model::add_customized_model(pool, mid, bmid).await;
            report_outcome(out, name, result)
        }
        StoreCommand::DeleteBaseModel { bmid } => {
            let result = base_model::delete_base_model(pool, bmid).await;
            report_outcome(out, name, result)
        }
        StoreCommand::ListInternetService { bmid } => {
            let result = internet_service::list_internet_services(pool, bmid).await;
            write_rows(out, name, result)
        }
        StoreCommand::CountCustomizedModel { bmids } => {
            let result = customized_model::count_customized_models(pool, &bmids).await;
            write_rows(out, name, result)
        }
        StoreCommand::TopNDurationConfig { uid, n } => {
            let result = model_configuration::top_n_duration_configs(pool, uid, n).await;
            write_rows(out, name, result)
        }
        StoreCommand::ListBaseModelKeyWord { keyword } => {
            let result = base_model::list_base_models_by_keyword(pool, &keyword).await;
            write_rows(out, name, result)
        }
    }
}

fn report_outcome<W: Write, T>(
    out: &mut W,
    command: &str,
    result: platform_db::Result<T>,
) -> io::Result<()> {
    let outcome = match result {
        Ok(_) => {
            info!(command, "Command succeeded");
            Outcome::Success
        }
        Err(e) => {
            warn!(command, error = %e, "Command failed");
            Outcome::Fail
        }
    };
    writeln!(out, "{}", outcome)
}

/// Write rows as headerless CSV. NULLs render as empty fields.
fn write_rows<W: Write, T: Serialize>(
    out: &mut W,
    command: &str,
    result: platform_db::Result<Vec<T>>,
) -> io::Result<()> {
    let rows = match result {
        Ok(rows) => rows,
        Err(e) => {
            warn!(command, error = %e, "Query failed");
            return Ok(());
        }
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(&mut *out);
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    debug!(command, rows = rows.len(), "Query complete");
    Ok(())
}

/// Echo a results file line by line, or a not-found message if it is missing.
pub fn print_nl2sql_result<W: Write>(path: &Path, out: &mut W) -> io::Result<()> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return writeln!(out, "Error: {} not found", path.display());
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Could not open results file");
            return writeln!(out, "Error: could not read {}", path.display());
        }
    };

    for line in BufReader::new(file).lines() {
        match line {
            Ok(line) => writeln!(out, "{}", line)?,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Could not read results file");
                return writeln!(out, "Error: could not read {}", path.display());
            }
        }
    }

    Ok(())
}
