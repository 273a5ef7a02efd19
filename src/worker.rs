mod person_capability;

use crate::{db, nice_display::NiceDisplay};
use sqlx::postgres::PgPoolOptions;
use sqlx::Postgres;
use std::time::Duration;

/// Postgres-backed capabilities. Cloning shares the pool.
#[derive(Clone, Debug)]
pub struct Worker {
    pub sqlx: sqlx::Pool<Postgres>,
}

#[derive(Debug)]
pub enum InitError {
    DbConfig(db::ConfigError),
    PoolConnection(sqlx::Error),
    PoolAcquire(sqlx::Error),
}

impl NiceDisplay for InitError {
    fn message(&self) -> String {
        match self {
            InitError::DbConfig(err) => {
                format!("Database configuration error\n{}", err.message())
            }
            InitError::PoolConnection(err) => {
                format!("Error connecting to the database pool\n{}", err)
            }
            InitError::PoolAcquire(err) => {
                format!(
                    "Error acquiring a database connection from the pool\n{}",
                    err
                )
            }
        }
    }
}

impl Worker {
    pub async fn new() -> Result<Self, InitError> {
        let db_info = db::Config::load().await.map_err(InitError::DbConfig)?;

        let sqlx_pool = PgPoolOptions::new()
            .min_connections(2)
            .idle_timeout(Duration::from_secs(600))
            .max_connections(19)
            .test_before_acquire(true)
            .connect(&db_info.to_url())
            .await
            .map_err(InitError::PoolConnection)?;

        sqlx::query("SELECT 1")
            .execute(&sqlx_pool)
            .await
            .map_err(InitError::PoolAcquire)?;

        tracing::info!(host = %db_info.host, db = %db_info.name, "connected to postgres");

        Ok(Worker { sqlx: sqlx_pool })
    }
}
