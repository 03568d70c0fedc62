//! Database models.
//!
//! Result rows serialize in column order, so a headerless CSV writer renders
//! them exactly as the query operations print them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Input for registering an agent client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAgentClient {
    /// User id, shared by the `User` and `AgentClient` rows.
    pub uid: i64,
    pub username: String,
    pub email: String,
    pub card_number: i64,
    pub card_holder_name: String,
    pub expiration_date: NaiveDate,
    pub cvv: i64,
    pub zip: i64,
    /// Free text, split on `,` or `;` into `Client_Interests` rows.
    pub interests: String,
}

/// An internet service used by a base model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct InternetService {
    pub sid: i64,
    pub endpoint: String,
    pub provider: String,
}

/// Number of customized models derived from a base model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CustomizedModelCount {
    pub bmid: i64,
    pub description: Option<String>,
    pub customized_model_count: i64,
}

/// A client's model configuration, as ranked by duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ConfigurationDuration {
    pub uid: i64,
    pub cid: i64,
    pub label: Option<String>,
    pub content: Option<String>,
    pub duration: Option<i64>,
}

/// A base model served by an LLM service whose domain matched a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BaseModelKeywordMatch {
    pub bmid: i64,
    pub sid: i64,
    pub provider: String,
    pub domain: String,
}
