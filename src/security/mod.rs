// [rust] Security module organization
pub mod sql_guard; // [security] Read-only statement checks for the raw-query route

pub use sql_guard::*;
