use crate::db::Database;
use sqlx::query_scalar;
use thiserror::Error;
use tracing::{info, warn};

// [business] Schema objects the fixed routes are written against
pub const ROW_TABLE: &str = "RowData";
pub const PLANT_TABLE: &str = "PlantData";

// Always selected alongside a property; never a property itself.
const TIMESTAMP_COLUMN: &str = "timestamp";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Table is not on the allow-list: {0}")]
    UnknownTable(String),
    #[error("Not a PlantData property column: {0}")]
    UnknownProperty(String),
}

/// Allow-lists that map client-supplied identifiers onto real schema objects.
///
/// Built once at startup and shared read-only by every request. Anything the
/// catalog returns is the catalog's own copy of the name, never the client's
/// string.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    tables: Vec<String>,
    plant_properties: Vec<String>,
}

impl SchemaCatalog {
    pub fn new(tables: Vec<String>, plant_columns: Vec<String>) -> Self {
        let plant_properties = plant_columns
            .into_iter()
            .filter(|column| !column.eq_ignore_ascii_case(TIMESTAMP_COLUMN))
            .collect();

        Self {
            tables,
            plant_properties,
        }
    }

    /// Reads the PlantData column list from `information_schema` and pairs it
    /// with the configured table allow-list.
    pub async fn load(db: &Database, allowed_tables: &[String]) -> Result<Self, sqlx::Error> {
        let plant_columns = query_scalar::<_, String>(
            "SELECT column_name::text
             FROM information_schema.columns
             WHERE table_schema = 'public' AND table_name = $1
             ORDER BY ordinal_position",
        )
        .bind(PLANT_TABLE)
        .fetch_all(db.as_ref())
        .await?;

        if plant_columns.is_empty() {
            warn!(
                "Table public.\"{}\" has no visible columns; every property will be rejected",
                PLANT_TABLE
            );
        }

        let present = query_scalar::<_, String>(
            "SELECT table_name::text
             FROM information_schema.tables
             WHERE table_schema = 'public' AND table_name = ANY($1)",
        )
        .bind(allowed_tables)
        .fetch_all(db.as_ref())
        .await?;

        // Missing tables stay allowed; querying them surfaces as an execution failure.
        for table in allowed_tables.iter().filter(|t| !present.contains(*t)) {
            warn!("Allow-listed table public.\"{}\" does not exist", table);
        }

        let catalog = Self::new(allowed_tables.to_vec(), plant_columns);
        info!(
            "Schema catalog loaded - Tables: {:?}, Plant properties: {:?}",
            catalog.tables, catalog.plant_properties
        );

        Ok(catalog)
    }

    // Table names are quoted identifiers, so matching is exact.
    pub fn resolve_table(&self, requested: &str) -> Result<&str, CatalogError> {
        self.tables
            .iter()
            .find(|table| table.as_str() == requested)
            .map(String::as_str)
            .ok_or_else(|| CatalogError::UnknownTable(requested.to_string()))
    }

    // Properties were historically unquoted, so PostgreSQL case folding applies.
    pub fn resolve_property(&self, requested: &str) -> Result<&str, CatalogError> {
        self.plant_properties
            .iter()
            .find(|column| column.as_str() == requested)
            .or_else(|| {
                self.plant_properties
                    .iter()
                    .find(|column| column.eq_ignore_ascii_case(requested))
            })
            .map(String::as_str)
            .ok_or_else(|| CatalogError::UnknownProperty(requested.to_string()))
    }

    pub fn plant_properties(&self) -> &[String] {
        &self.plant_properties
    }
}

/// Quotes an identifier for direct inclusion in statement text.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new(
            vec!["RowData".to_string(), "PlantData".to_string()],
            vec![
                "rowid".to_string(),
                "plantid".to_string(),
                "timestamp".to_string(),
                "moisture".to_string(),
                "Temperature".to_string(),
            ],
        )
    }

    #[test]
    fn test_resolve_allowed_table() {
        assert_eq!(catalog().resolve_table("PlantData"), Ok("PlantData"));
    }

    #[test]
    fn test_table_lookup_is_case_sensitive() {
        assert_eq!(
            catalog().resolve_table("plantdata"),
            Err(CatalogError::UnknownTable("plantdata".to_string()))
        );
    }

    #[test]
    fn test_injection_attempt_rejected() {
        let attempt = "RowData\"; DROP TABLE \"RowData";
        assert!(matches!(
            catalog().resolve_table(attempt),
            Err(CatalogError::UnknownTable(_))
        ));
        assert!(catalog().resolve_property("moisture, password").is_err());
    }

    #[test]
    fn test_resolve_property_folds_case() {
        let catalog = catalog();
        assert_eq!(catalog.resolve_property("moisture"), Ok("moisture"));
        assert_eq!(catalog.resolve_property("MOISTURE"), Ok("moisture"));
        assert_eq!(catalog.resolve_property("Temperature"), Ok("Temperature"));
        assert_eq!(catalog.resolve_property("temperature"), Ok("Temperature"));
    }

    #[test]
    fn test_timestamp_is_not_a_property() {
        assert!(catalog().resolve_property("timestamp").is_err());
        assert_eq!(catalog().plant_properties().len(), 4);
    }

    #[test]
    fn test_quote_ident_doubles_quotes() {
        assert_eq!(quote_ident("PlantData"), "\"PlantData\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
