// [security] Read-only guard for statements arriving through /api/query
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SqlGuardError {
    #[error("Statement is empty")]
    Empty,
    #[error("Only a single statement is allowed")]
    MultipleStatements,
    #[error("Only SELECT or WITH statements are allowed")]
    NotReadOnly,
    #[error("Keyword not allowed in a read-only statement: {0}")]
    ForbiddenKeyword(String),
}

// [security] Whole words only, so columns like `updated_at` pass
const FORBIDDEN_KEYWORDS: [&str; 11] = [
    "INSERT", "UPDATE", "DELETE", "MERGE", "DROP", "CREATE", "ALTER", "TRUNCATE", "GRANT",
    "REVOKE", "COPY",
];

// [security] Returns the statement with surrounding whitespace and trailing semicolons removed
pub fn ensure_read_only(sql: &str) -> Result<&str, SqlGuardError> {
    let statement = sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());

    if statement.is_empty() {
        return Err(SqlGuardError::Empty);
    }

    if statement.contains(';') {
        return Err(SqlGuardError::MultipleStatements);
    }

    let mut words = statement
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .map(|word| word.to_ascii_uppercase());

    match words.next().as_deref() {
        Some("SELECT") | Some("WITH") => {}
        _ => return Err(SqlGuardError::NotReadOnly),
    }

    if let Some(keyword) = words.find(|word| FORBIDDEN_KEYWORDS.contains(&word.as_str())) {
        return Err(SqlGuardError::ForbiddenKeyword(keyword));
    }

    Ok(statement)
}
