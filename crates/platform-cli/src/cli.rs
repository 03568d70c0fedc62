//! Command-line surface.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use platform_db::NewAgentClient;

/// File echoed by `printNL2SQLresult` when no path is given.
pub const NL2SQL_RESULTS_FILE: &str = "nl2sql_results.csv";

#[derive(Debug, Parser)]
#[command(name = "agent-platform")]
#[command(about = "Load and query the agent platform database")]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection overrides. Unset flags fall back to `PLATFORM_DB_*` variables.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Database server host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Database user
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Database password
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// SQLite database file or `sqlite:` URL
    #[arg(long, global = true)]
    pub database: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Store(StoreCommand),

    /// Print the NL2SQL experiment results file
    #[command(name = "printNL2SQLresult")]
    PrintNl2sqlResult {
        #[arg(default_value = NL2SQL_RESULTS_FILE)]
        path: PathBuf,
    },
}

impl Command {
    /// Whether the command writes to the database and reports `Success`/`Fail`.
    pub fn is_write(&self) -> bool {
        matches!(self, Command::Store(command) if command.is_write())
    }

    /// Name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Store(command) => command.name(),
            Command::PrintNl2sqlResult { .. } => "printNL2SQLresult",
        }
    }
}

/// Commands that open the database.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum StoreCommand {
    /// Drop and recreate every table, then load <Table>.csv files from a folder
    #[command(name = "import")]
    Import { folder: PathBuf },

    /// Register an agent client along with its user row and interests
    #[command(name = "insertAgentClient")]
    InsertAgentClient(InsertAgentClientArgs),

    /// Derive a customized model from a base model
    #[command(name = "addCustomizedModel")]
    AddCustomizedModel { mid: i64, bmid: i64 },

    /// Delete a base model and everything that depends on it
    #[command(name = "deleteBaseModel")]
    DeleteBaseModel { bmid: i64 },

    /// List internet services used by a base model
    #[command(name = "listInternetService")]
    ListInternetService { bmid: i64 },

    /// Count customized models for one or more base models
    #[command(name = "countCustomizedModel")]
    CountCustomizedModel {
        #[arg(required = true, num_args = 1..)]
        bmids: Vec<i64>,
    },

    /// Show a client's N longest-running model configurations
    #[command(name = "topNDurationConfig")]
    TopNDurationConfig {
        uid: i64,
        #[arg(allow_negative_numbers = true)]
        n: i64,
    },

    /// Find base models whose LLM service domain contains a keyword
    #[command(name = "listBaseModelKeyWord")]
    ListBaseModelKeyWord {
        #[arg(allow_hyphen_values = true)]
        keyword: String,
    },
}

impl StoreCommand {
    /// Whether the command writes to the database and reports `Success`/`Fail`.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StoreCommand::Import { .. }
                | StoreCommand::InsertAgentClient(_)
                | StoreCommand::AddCustomizedModel { .. }
                | StoreCommand::DeleteBaseModel { .. }
        )
    }

    /// Name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            StoreCommand::Import { .. } => "import",
            StoreCommand::InsertAgentClient(_) => "insertAgentClient",
            StoreCommand::AddCustomizedModel { .. } => "addCustomizedModel",
            StoreCommand::DeleteBaseModel { .. } => "deleteBaseModel",
            StoreCommand::ListInternetService { .. } => "listInternetService",
            StoreCommand::CountCustomizedModel { .. } => "countCustomizedModel",
            StoreCommand::TopNDurationConfig { .. } => "topNDurationConfig",
            StoreCommand::ListBaseModelKeyWord { .. } => "listBaseModelKeyWord",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct InsertAgentClientArgs {
    pub uid: i64,
    pub username: String,
    pub email: String,
    pub card_number: i64,
    pub card_holder: String,
    /// Card expiration date (YYYY-MM-DD)
    #[arg(value_parser = parse_date)]
    pub expiration_date: NaiveDate,
    pub cvv: i64,
    pub zip: i64,
    /// Interests separated by `,` or `;`
    #[arg(allow_hyphen_values = true)]
    pub interests: String,
}

impl From<InsertAgentClientArgs> for NewAgentClient {
    fn from(args: InsertAgentClientArgs) -> Self {
        NewAgentClient {
            uid: args.uid,
            username: args.username,
            email: args.email,
            card_number: args.card_number,
            card_holder_name: args.card_holder,
            expiration_date: args.expiration_date,
            cvv: args.cvv,
            zip: args.zip,
            interests: args.interests,
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected a YYYY-MM-DD date: {}", e))
}
