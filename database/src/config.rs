use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};

pub struct DatabaseConfig {
    pub path: String,
    pub max_connections: u32,
    pub busy_retries: usize,
    pub busy_retry_delay: Duration,
}

impl DatabaseConfig {
    pub fn from_cli_or_env_or_yaml(cli_arg: Option<String>, yaml_config: Option<String>) -> Self {
        let path = if let Some(arg) = cli_arg {
            arg
        } else if let Ok(env) = std::env::var("BEDWARS_DB") {
            env
        } else if let Some(yaml) = yaml_config {
            yaml
        } else {
            "bedwars_database.db".to_string()
        };

        Self {
            path,
            max_connections: 5,
            busy_retries: 5,
            busy_retry_delay: Duration::from_millis(100),
        }
    }

    /// WAL with NORMAL synchronous, so several component processes can share
    /// the file without serializing every read behind the writer.
    pub async fn create_pool(&self) -> Result<sqlx::SqlitePool, sqlx::Error> {
        SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&self.path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal),
            )
            .await
    }

    /// Read-only handle for inspection tools.
    pub async fn open_read_only(&self) -> Result<sqlx::SqlitePool, sqlx::Error> {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&self.path)
                    .read_only(true),
            )
            .await
    }
}
