use super::catalog::{quote_ident, PLANT_TABLE, ROW_TABLE};
use super::models::{QueryDescriptor, ResultSet};
use crate::db::Database;
use serde_json::Value;
use sqlx::query_scalar;
use tracing::debug;

/// Parses a path id the way PostgreSQL reads an integer literal.
///
/// `None` means the id cannot match any row; callers answer with an empty result
/// instead of querying.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

// RowData queries
pub fn row_summary() -> QueryDescriptor {
    QueryDescriptor::new(format!(
        "SELECT RowID, Status
         FROM public.{}
         ORDER BY RowID ASC",
        quote_ident(ROW_TABLE)
    ))
}

pub fn all_rows() -> QueryDescriptor {
    QueryDescriptor::new(format!(
        "SELECT *
         FROM public.{}
         ORDER BY RowID ASC",
        quote_ident(ROW_TABLE)
    ))
}

pub fn row_by_id(row_id: i64) -> QueryDescriptor {
    QueryDescriptor::new(format!(
        "SELECT *
         FROM public.{}
         WHERE RowID = $1
         ORDER BY RowID ASC",
        quote_ident(ROW_TABLE)
    ))
    .bind(row_id)
}

// PlantData queries
pub fn all_plants() -> QueryDescriptor {
    QueryDescriptor::new(format!(
        "SELECT *
         FROM public.{}
         ORDER BY RowID ASC",
        quote_ident(PLANT_TABLE)
    ))
}

/// Latest measurement of every plant under `row_id`.
///
/// The outer join is also keyed on RowID so a plant id reused under another
/// row cannot leak into the result. Only `pd.*` and `latest_timestamp` are
/// selected so `plantid` appears once per object.
pub fn latest_plants_in_row(row_id: i64) -> QueryDescriptor {
    let table = quote_ident(PLANT_TABLE);
    QueryDescriptor::new(format!(
        "SELECT pd.*, latest.latest_timestamp
         FROM public.{table} pd
         JOIN (
             SELECT RowID, PlantID, MAX(Timestamp) AS latest_timestamp
             FROM public.{table}
             WHERE RowID = $1
             GROUP BY RowID, PlantID
         ) AS latest
           ON pd.RowID = latest.RowID
          AND pd.PlantID = latest.PlantID
          AND pd.Timestamp = latest.latest_timestamp
         ORDER BY pd.PlantID ASC"
    ))
    .bind(row_id)
}

// `property` must already be resolved through the schema catalog.
pub fn plant_property_series(row_id: i64, plant_id: i64, property: &str) -> QueryDescriptor {
    QueryDescriptor::new(format!(
        "SELECT timestamp, {}
         FROM public.{}
         WHERE RowID = $1 AND PlantID = $2
         ORDER BY timestamp ASC",
        quote_ident(property),
        quote_ident(PLANT_TABLE)
    ))
    .bind(row_id)
    .bind(plant_id)
}

// Arbitrary tables - `table` must already be resolved through the schema catalog
pub fn whole_table(table: &str) -> QueryDescriptor {
    QueryDescriptor::new(format!("SELECT * FROM public.{}", quote_ident(table)))
}

// Raw statement - must already have passed the read-only guard
pub fn raw(sql: &str) -> QueryDescriptor {
    QueryDescriptor::new(sql)
}

/// Runs a descriptor on one pooled connection and returns its rows as JSON objects.
pub async fn fetch_rows(db: &Database, descriptor: &QueryDescriptor) -> Result<ResultSet, sqlx::Error> {
    let statement = descriptor.as_json_rows();

    let mut query = query_scalar::<_, Value>(&statement);
    for param in &descriptor.params {
        query = query.bind(*param);
    }

    let rows = query.fetch_all(db.as_ref()).await?;
    debug!("Query returned {} rows", rows.len());

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squash(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_fixed_queries_are_ordered() {
        assert_eq!(
            squash(&row_summary().sql),
            "SELECT RowID, Status FROM public.\"RowData\" ORDER BY RowID ASC"
        );
        assert_eq!(
            squash(&all_rows().sql),
            "SELECT * FROM public.\"RowData\" ORDER BY RowID ASC"
        );
        assert_eq!(
            squash(&all_plants().sql),
            "SELECT * FROM public.\"PlantData\" ORDER BY RowID ASC"
        );
        assert!(row_summary().params.is_empty());
    }

    #[test]
    fn test_row_id_compared_against_typed_column() {
        let descriptor = row_by_id(1);
        let sql = squash(&descriptor.sql);
        assert!(sql.contains("WHERE RowID = $1"));
        assert!(!sql.contains("::text"));
        assert_eq!(descriptor.params, vec![1]);
    }

    #[test]
    fn test_parse_id_follows_integer_literals() {
        assert_eq!(parse_id("1"), Some(1));
        assert_eq!(parse_id("01"), Some(1));
        assert_eq!(parse_id(" 42 "), Some(42));
        assert_eq!(parse_id("-3"), Some(-3));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("1 OR 1=1"), None);
        assert_eq!(parse_id(""), None);
    }

    #[test]
    fn test_latest_plants_groups_per_plant() {
        let descriptor = latest_plants_in_row(3);
        let sql = squash(&descriptor.sql);
        assert!(sql.starts_with("SELECT pd.*, latest.latest_timestamp FROM"));
        assert!(sql.contains("MAX(Timestamp) AS latest_timestamp"));
        assert!(sql.contains("GROUP BY RowID, PlantID"));
        assert!(sql.contains("pd.RowID = latest.RowID"));
        assert!(sql.ends_with("ORDER BY pd.PlantID ASC"));
        assert_eq!(descriptor.params, vec![3]);
    }

    #[test]
    fn test_property_series_quotes_column() {
        let descriptor = plant_property_series(2, 5, "moisture");
        let sql = squash(&descriptor.sql);
        assert!(sql.starts_with("SELECT timestamp, \"moisture\" FROM public.\"PlantData\""));
        assert!(sql.ends_with("ORDER BY timestamp ASC"));
        assert!(sql.contains("WHERE RowID = $1 AND PlantID = $2"));
        assert_eq!(descriptor.params, vec![2, 5]);
    }

    #[test]
    fn test_whole_table_quotes_name() {
        assert_eq!(whole_table("RowData").sql, "SELECT * FROM public.\"RowData\"");
    }
}
