// [rust] Module declarations - the binary in main.rs and the tests/ suite share these
pub mod config; // Configuration management and environment variable handling
pub mod db; // Connection pool, schema allow-lists, statement builders
pub mod security; // Read-only guard for the raw-query route
pub mod web; // HTTP routing, handlers and error mapping
