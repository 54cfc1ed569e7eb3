// [library] Serde - JSON shapes for responses
use serde::Serialize;
use serde_json::Value;

// [business] One row object per entry, keyed by column name in select-list order
pub type ResultSet = Vec<Value>;

// [business] SQL text plus the ids bound to $1, $2, ...
// Built per request; client-supplied values only ever reach the database through `params`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub sql: String,
    pub params: Vec<i64>,
}

impl QueryDescriptor {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    // [rust] Builder method - parameters are numbered in the order they are bound
    pub fn bind(mut self, value: i64) -> Self {
        self.params.push(value);
        self
    }

    /// Wraps the statement so PostgreSQL returns each row as a single JSON object.
    ///
    /// `q.*` is a whole-row reference even when the statement has a column named `q`.
    /// The statement sits on its own lines so a trailing `--` comment cannot swallow
    /// the closing parenthesis. Trailing semicolons are dropped since the statement
    /// becomes a subquery.
    pub fn as_json_rows(&self) -> String {
        let inner = self.sql.trim().trim_end_matches(';').trim_end();
        format!("SELECT to_json(q.*) FROM (\n{inner}\n) AS q")
    }
}

// [business] Client-facing error body - deliberately carries no detail
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}
