use std::env;

/// Database configuration.
///
/// The connection URL comes from `BASELINE_DATABASE_URL`, with a localhost
/// fallback for development setups.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full PostgreSQL connection URL.
    pub database_url: String,
}

impl DbConfig {
    /// Connection URL used when nothing else is configured.
    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/baseline";

    /// Build a config from the environment, falling back to
    /// [`Self::DEFAULT_URL`].
    pub fn from_env() -> Self {
        let database_url =
            env::var("BASELINE_DATABASE_URL").unwrap_or_else(|_| Self::DEFAULT_URL.to_owned());
        Self { database_url }
    }

    /// Build a config from an explicit URL (CLI flags, tests).
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Split the URL into (everything up to the database name, database
    /// name, query string). The query string includes its leading `?` and
    /// is empty when absent.
    fn split_url(&self) -> Option<(&str, &str, &str)> {
        let (base, query) = match self.database_url.find('?') {
            Some(pos) => self.database_url.split_at(pos),
            None => (self.database_url.as_str(), ""),
        };
        let slash = base.rfind('/')?;
        let name = &base[slash + 1..];
        if name.is_empty() {
            return None;
        }
        Some((&base[..slash], name, query))
    }

    /// The database name from the URL, ignoring any query parameters
    /// (`...?sslmode=require`). `None` when the URL has no name component.
    pub fn database_name(&self) -> Option<&str> {
        self.split_url().map(|(_, name, _)| name)
    }

    /// URL for the `postgres` maintenance database on the same server,
    /// carrying over any query parameters. Used to issue `CREATE DATABASE`
    /// when the target database does not exist yet.
    pub fn maintenance_url(&self) -> String {
        match self.split_url() {
            Some((prefix, _, query)) => format!("{prefix}/postgres{query}"),
            None => self.database_url.clone(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url() {
        let cfg = DbConfig::new(DbConfig::DEFAULT_URL);
        assert_eq!(cfg.database_url, "postgresql://localhost:5432/baseline");
    }

    #[test]
    fn database_name_extraction() {
        let cfg = DbConfig::new("postgresql://localhost:5432/mydb");
        assert_eq!(cfg.database_name(), Some("mydb"));
    }

    #[test]
    fn database_name_ignores_query_params() {
        let cfg = DbConfig::new("postgresql://localhost:5432/mydb?sslmode=require");
        assert_eq!(cfg.database_name(), Some("mydb"));
    }

    #[test]
    fn database_name_missing() {
        let cfg = DbConfig::new("postgresql://localhost:5432/");
        assert_eq!(cfg.database_name(), None);
    }

    #[test]
    fn maintenance_url_replaces_db() {
        let cfg = DbConfig::new("postgresql://localhost:5432/baseline");
        assert_eq!(
            cfg.maintenance_url(),
            "postgresql://localhost:5432/postgres"
        );
    }

    #[test]
    fn maintenance_url_keeps_query_params() {
        let cfg = DbConfig::new("postgresql://localhost:5432/baseline?sslmode=require");
        assert_eq!(
            cfg.maintenance_url(),
            "postgresql://localhost:5432/postgres?sslmode=require"
        );
    }
}
