//! Declared table graph for the agent platform.
//!
//! Every table is declared once as a static [`Table`]. The `CREATE TABLE`
//! statements are generated from these declarations, and the order in which
//! tables are created and dropped is derived from their foreign keys rather
//! than written out by hand.

use std::collections::{HashMap, VecDeque};
use std::fmt::Write as _;

use thiserror::Error;

/// Errors raised while resolving the table graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two tables share a name.
    #[error("table {0} is declared more than once")]
    DuplicateTable(String),

    /// A foreign key points at a table that is not declared.
    #[error("table {table} references undeclared table {references}")]
    UnknownTable { table: String, references: String },

    /// The foreign keys form a cycle.
    #[error("foreign keys form a cycle through: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

/// Column storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Int,
    BigInt,
    Text,
    Date,
    Varchar(usize),
}

impl SqlType {
    fn ddl(&self) -> String {
        match self {
            SqlType::Int => "INT".to_string(),
            SqlType::BigInt => "BIGINT".to_string(),
            SqlType::Text => "TEXT".to_string(),
            SqlType::Date => "DATE".to_string(),
            SqlType::Varchar(len) => format!("VARCHAR({})", len),
        }
    }
}

/// A single column declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub not_null: bool,
    pub unique: bool,
}

impl Column {
    const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            not_null: false,
            unique: false,
        }
    }

    const fn required(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            not_null: true,
            unique: false,
        }
    }

    const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    /// Maximum length for `VARCHAR` columns.
    pub fn max_len(&self) -> Option<usize> {
        match self.sql_type {
            SqlType::Varchar(len) => Some(len),
            _ => None,
        }
    }
}

/// A single-column foreign key. All platform foreign keys cascade on delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: &'static str,
    pub ref_column: &'static str,
}

impl ForeignKey {
    const fn new(column: &'static str, references: &'static str, ref_column: &'static str) -> Self {
        Self {
            column,
            references,
            ref_column,
        }
    }
}

/// A table declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
}

impl Table {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Name of the CSV file this table is loaded from.
    pub fn csv_file_name(&self) -> String {
        format!("{}.csv", self.name)
    }

    /// Tables this one references, excluding itself.
    pub fn dependencies(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references)
            .filter(move |r| *r != self.name)
    }

    /// `CREATE TABLE` statement for this declaration.
    pub fn create_sql(&self) -> String {
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|col| {
                let mut line = format!("{} {}", quote_ident(col.name), col.sql_type.ddl());
                // SQLite accepts NULL in non-INTEGER primary keys unless told otherwise.
                if col.not_null || self.primary_key.contains(&col.name) {
                    line.push_str(" NOT NULL");
                }
                if col.unique {
                    line.push_str(" UNIQUE");
                }
                line
            })
            .collect();

        let pk: Vec<String> = self.primary_key.iter().map(|c| quote_ident(c)).collect();
        lines.push(format!("PRIMARY KEY ({})", pk.join(", ")));

        for fk in self.foreign_keys {
            lines.push(format!(
                "FOREIGN KEY ({}) REFERENCES {}({}) ON DELETE CASCADE",
                quote_ident(fk.column),
                quote_ident(fk.references),
                quote_ident(fk.ref_column)
            ));
        }

        let mut sql = format!("CREATE TABLE {} (\n", quote_ident(self.name));
        for (i, line) in lines.iter().enumerate() {
            let sep = if i + 1 == lines.len() { "" } else { "," };
            let _ = writeln!(sql, "    {}{}", line, sep);
        }
        sql.push(')');
        sql
    }

    /// `DROP TABLE IF EXISTS` statement for this declaration.
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_ident(self.name))
    }

    /// Parameterized insert into the given columns, in order.
    pub fn insert_sql(&self, columns: &[&str]) -> String {
        let cols: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(self.name),
            cols.join(", "),
            placeholders
        )
    }
}

/// Quote an identifier for SQLite.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Order tables so every table comes after the tables it references.
///
/// Ties are broken by declaration order, so a list that is already in
/// dependency order comes back unchanged.
pub fn creation_order(tables: &[Table]) -> Result<Vec<&Table>, SchemaError> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(tables.len());
    for (i, table) in tables.iter().enumerate() {
        if index.insert(table.name, i).is_some() {
            return Err(SchemaError::DuplicateTable(table.name.to_string()));
        }
    }

    let mut pending = vec![0usize; tables.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tables.len()];
    for (i, table) in tables.iter().enumerate() {
        let mut seen: Vec<usize> = Vec::new();
        for dep in table.dependencies() {
            let &j = index.get(dep).ok_or_else(|| SchemaError::UnknownTable {
                table: table.name.to_string(),
                references: dep.to_string(),
            })?;
            // A table may reference the same parent through several columns.
            if !seen.contains(&j) {
                seen.push(j);
                pending[i] += 1;
                dependents[j].push(i);
            }
        }
    }

    let mut ready: VecDeque<usize> = (0..tables.len()).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(tables.len());

    while let Some(i) = ready.pop_front() {
        order.push(&tables[i]);
        let mut unlocked = Vec::new();
        for &child in &dependents[i] {
            pending[child] -= 1;
            if pending[child] == 0 {
                unlocked.push(child);
            }
        }
        // Keep the queue sorted by declaration position.
        for child in unlocked {
            let pos = ready.iter().position(|&r| r > child).unwrap_or(ready.len());
            ready.insert(pos, child);
        }
    }

    if order.len() != tables.len() {
        let stuck = tables
            .iter()
            .enumerate()
            .filter(|(i, _)| pending[*i] > 0)
            .map(|(_, t)| t.name.to_string())
            .collect();
        return Err(SchemaError::Cycle(stuck));
    }

    Ok(order)
}

/// Order tables so every table is dropped before the tables it references.
pub fn drop_order(tables: &[Table]) -> Result<Vec<&Table>, SchemaError> {
    let mut order = creation_order(tables)?;
    order.reverse();
    Ok(order)
}

use SqlType::{BigInt, Date, Int, Text, Varchar};

pub const USER: Table = Table {
    name: "User",
    columns: &[
        Column::new("uid", Int),
        Column::required("username", Varchar(255)),
        Column::required("email", Varchar(255)).unique(),
    ],
    primary_key: &["uid"],
    foreign_keys: &[],
};

pub const AGENT_CREATOR: Table = Table {
    name: "AgentCreator",
    columns: &[
        Column::new("uid", Int),
        Column::required("payout_account", Varchar(255)),
        Column::new("bio", Text),
    ],
    primary_key: &["uid"],
    foreign_keys: &[ForeignKey::new("uid", "User", "uid")],
};

pub const AGENT_CLIENT: Table = Table {
    name: "AgentClient",
    columns: &[
        Column::new("uid", Int),
        Column::new("interests", Text),
        Column::required("card_holder_name", Varchar(255)),
        Column::required("expiration_date", Date),
        Column::required("card_number", BigInt),
        Column::required("cvv", Int),
        Column::required("zip", Int),
    ],
    primary_key: &["uid"],
    foreign_keys: &[ForeignKey::new("uid", "User", "uid")],
};

pub const CLIENT_INTERESTS: Table = Table {
    name: "Client_Interests",
    columns: &[
        Column::new("uid", Int),
        Column::new("interest", Varchar(255)),
    ],
    primary_key: &["uid", "interest"],
    foreign_keys: &[ForeignKey::new("uid", "AgentClient", "uid")],
};

pub const INTERNET_SERVICE: Table = Table {
    name: "InternetService",
    columns: &[
        Column::new("sid", Int),
        Column::required("endpoint", Varchar(500)),
        Column::required("provider", Varchar(255)),
    ],
    primary_key: &["sid"],
    foreign_keys: &[],
};

pub const LLM_SERVICE: Table = Table {
    name: "LLMService",
    columns: &[
        Column::new("sid", Int),
        Column::new("domain", Varchar(255)),
    ],
    primary_key: &["sid"],
    foreign_keys: &[ForeignKey::new("sid", "InternetService", "sid")],
};

pub const DATA_STORAGE_SERVICE: Table = Table {
    name: "DataStorageService",
    columns: &[
        Column::new("sid", Int),
        Column::new("type", Varchar(255)),
    ],
    primary_key: &["sid"],
    foreign_keys: &[ForeignKey::new("sid", "InternetService", "sid")],
};

pub const BASE_MODEL: Table = Table {
    name: "BaseModel",
    columns: &[
        Column::new("bmid", Int),
        Column::required("uid", Int),
        Column::new("description", Text),
    ],
    primary_key: &["bmid"],
    foreign_keys: &[ForeignKey::new("uid", "AgentCreator", "uid")],
};

pub const BASE_MODEL_UTILIZATION: Table = Table {
    name: "BaseModelUtilization",
    columns: &[
        Column::new("bmid", Int),
        Column::new("sid", Int),
        Column::required("version", Int),
    ],
    primary_key: &["bmid", "sid"],
    foreign_keys: &[
        ForeignKey::new("bmid", "BaseModel", "bmid"),
        ForeignKey::new("sid", "InternetService", "sid"),
    ],
};

pub const CUSTOMIZED_MODEL: Table = Table {
    name: "CustomizedModel",
    columns: &[
        Column::required("bmid", Int),
        Column::new("mid", Int),
    ],
    primary_key: &["mid"],
    foreign_keys: &[ForeignKey::new("bmid", "BaseModel", "bmid")],
};

pub const MODEL_CONFIGURATION: Table = Table {
    name: "ModelConfiguration",
    columns: &[
        Column::new("cid", Int),
        Column::required("uid", Int),
        Column::required("mid", Int),
        Column::new("label", Varchar(255)),
        Column::new("content", Text),
        Column::new("duration", Int),
    ],
    primary_key: &["cid"],
    foreign_keys: &[
        ForeignKey::new("uid", "AgentClient", "uid"),
        ForeignKey::new("mid", "CustomizedModel", "mid"),
    ],
};

/// Every table of the agent platform.
pub const PLATFORM_TABLES: &[Table] = &[
    USER,
    AGENT_CREATOR,
    AGENT_CLIENT,
    CLIENT_INTERESTS,
    INTERNET_SERVICE,
    LLM_SERVICE,
    DATA_STORAGE_SERVICE,
    BASE_MODEL,
    BASE_MODEL_UTILIZATION,
    CUSTOMIZED_MODEL,
    MODEL_CONFIGURATION,
];
