// [library] Secrecy crate - keeps the database password out of Debug output and logs
use secrecy::{ExposeSecret, Secret};

// [library] SQLx connect options - built field by field so the password never needs URL escaping
use sqlx::postgres::PgConnectOptions;

use std::net::{IpAddr, Ipv4Addr};

use anyhow::{anyhow, Context};

// [business] Tables reachable through /api/data when ALLOWED_TABLES is not set
const DEFAULT_ALLOWED_TABLES: &str = "RowData,PlantData";

// [business] Listen port used when PORT is not set
const DEFAULT_APP_PORT: u16 = 3001;

#[derive(Debug, Clone)]
pub struct Config {
    // [business] Network binding configuration - where the gateway listens
    pub app_host: IpAddr,
    pub app_port: u16,

    // [business] PostgreSQL connection parameters
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: Secret<String>, // [security] Never logged
    pub db_name: String,

    // [security] Identifier allow-list for /api/data/:tableName
    pub allowed_tables: Vec<String>,

    // [security] The raw-query route stays off unless explicitly enabled
    pub enable_raw_query: bool,

    // [security] CORS origins - empty means any origin
    pub allowed_origins: Vec<String>,
}

impl Config {
    // [business] Load configuration from the process environment (and .env if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        tracing::info!(
            "Config loaded - Bind: {}, Database: {}@{}:{}/{}, Tables: {:?}, Raw query: {}",
            config.bind_address(),
            config.db_user,
            config.db_host,
            config.db_port,
            config.db_name,
            config.allowed_tables,
            config.enable_raw_query
        );

        Ok(config)
    }

    // [rust] Environment access is injected so parsing can be tested with a plain map
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> anyhow::Result<String> {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow!("{} must be set", key))
        };

        let db_port = required("DB_PORT")?
            .trim()
            .parse::<u16>()
            .with_context(|| "DB_PORT must be a valid port number")?;

        let app_port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .with_context(|| "PORT must be a valid port number")?,
            None => DEFAULT_APP_PORT,
        };

        let app_host = lookup("APP_HOST")
            .and_then(|host| host.trim().parse().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let allowed_tables = split_list(
            &lookup("ALLOWED_TABLES").unwrap_or_else(|| DEFAULT_ALLOWED_TABLES.to_string()),
        );

        let enable_raw_query = lookup("ENABLE_RAW_QUERY")
            .map(|flag| matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        // [security] "*" and an unset variable both mean "any origin"
        let allowed_origins = split_list(&lookup("ALLOWED_ORIGINS").unwrap_or_default())
            .into_iter()
            .filter(|origin| origin != "*")
            .collect();

        Ok(Config {
            app_host,
            app_port,
            db_host: required("DB_HOST")?,
            db_port,
            db_user: required("DB_USER")?,
            db_password: Secret::new(required("DB_PASSWORD")?),
            db_name: required("DB_NAME")?,
            allowed_tables,
            enable_raw_query,
            allowed_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app_host, self.app_port)
    }

    // [security] The only place the password is exposed
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(self.db_password.expose_secret())
            .database(&self.db_name)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn database_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "5433"),
            ("DB_USER", "gateway"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_NAME", "greenhouse"),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&database_vars())).unwrap();

        assert_eq!(config.app_port, 3001);
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert_eq!(config.db_port, 5433);
        assert_eq!(config.allowed_tables, vec!["RowData", "PlantData"]);
        assert!(!config.enable_raw_query);
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_optional_overrides() {
        let mut vars = database_vars();
        vars.extend([
            ("PORT", "8080"),
            ("APP_HOST", "127.0.0.1"),
            ("ALLOWED_TABLES", " RowData , Sensors ,,"),
            ("ENABLE_RAW_QUERY", "TRUE"),
            ("ALLOWED_ORIGINS", "http://localhost:3000, *"),
        ]);
        let config = Config::from_lookup(lookup_from(&vars)).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.allowed_tables, vec!["RowData", "Sensors"]);
        assert!(config.enable_raw_query);
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_missing_database_setting_fails() {
        let vars: Vec<_> = database_vars()
            .into_iter()
            .filter(|(k, _)| *k != "DB_PASSWORD")
            .collect();

        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("DB_PASSWORD"));
    }

    #[test]
    fn test_invalid_port_fails() {
        let mut vars = database_vars();
        vars.push(("PORT", "not-a-port"));

        assert!(Config::from_lookup(lookup_from(&vars)).is_err());
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let config = Config::from_lookup(lookup_from(&database_vars())).unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
