//! Test utilities for database operations.
//!
//! Provides helpers for setting up and tearing down test databases: a
//! `PostgreSQL` database driven by `TEST_DB_*` variables, and an in-memory
//! `SQLite` database whose schema is generated from the entities.

use crate::entities::{
    Action, Brand, Contact, Follow, Product, ProductLike, ProductRating, User, contact, follow,
    product_like, product_rating,
};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    EntityTrait, Schema, Statement, sea_query::IndexCreateStatement,
};
use tracing::info;

async fn create_table<E: EntityTrait>(
    conn: &DatabaseConnection,
    entity: E,
) -> Result<(), DbErr> {
    let backend = conn.get_database_backend();
    let stmt = Schema::new(backend).create_table_from_entity(entity);
    conn.execute(backend.build(&stmt)).await?;
    Ok(())
}

async fn create_index(
    conn: &DatabaseConnection,
    stmt: &IndexCreateStatement,
) -> Result<(), DbErr> {
    conn.execute(conn.get_database_backend().build(stmt)).await?;
    Ok(())
}

/// Create every table from the entity definitions, then the unique pair
/// index of each edge table.
///
/// Parents are created before children so foreign keys resolve.
pub async fn create_schema(conn: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(conn, User).await?;
    create_table(conn, Brand).await?;
    create_table(conn, Product).await?;
    create_table(conn, Follow).await?;
    create_table(conn, Contact).await?;
    create_table(conn, ProductLike).await?;
    create_table(conn, ProductRating).await?;
    create_table(conn, Action).await?;

    create_index(conn, &follow::unique_pair_index()).await?;
    create_index(conn, &contact::unique_pair_index()).await?;
    create_index(conn, &product_like::unique_pair_index()).await?;
    create_index(conn, &product_rating::unique_pair_index()).await?;
    Ok(())
}

/// Open a private in-memory `SQLite` database with the full schema.
///
/// Requires the `test-utils` feature (or `sqlx-sqlite` on sea-orm).
pub async fn memory_database() -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    // Every pooled connection would otherwise see its own empty database.
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let conn = Database::connect(opt).await?;
    create_schema(&conn).await?;
    Ok(conn)
}

/// Test database configuration.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER").unwrap_or_else(|_| "vitrine_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "vitrine_test".to_string()),
            database: std::env::var("TEST_DB_NAME").unwrap_or_else(|_| "vitrine_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// Get the database URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}

/// A live `PostgreSQL` test database.
///
/// The schema is created from the entities on demand; tables are emptied
/// with [`TestDatabase::cleanup`].
pub struct TestDatabase {
    /// Database connection.
    pub conn: DatabaseConnection,
    /// Database configuration.
    pub config: TestDbConfig,
}

/// Tables in child-first order.
const TABLES: &[&str] = &[
    "action",
    "product_rating",
    "product_like",
    "contact",
    "follow",
    "product",
    "brand",
    "user",
];

impl TestDatabase {
    /// Connect using `TEST_DB_*` variables.
    pub async fn new() -> Result<Self, DbErr> {
        Self::with_config(TestDbConfig::default()).await
    }

    /// Connect with a custom configuration.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;
        info!(database = %config.database, "Connected to test database");
        Ok(Self { conn, config })
    }

    /// Create every table unless it already exists.
    pub async fn ensure_schema(&self) -> Result<(), DbErr> {
        let exists = self
            .conn
            .query_one(Statement::from_string(
                DatabaseBackend::Postgres,
                "SELECT 1 FROM pg_tables WHERE schemaname = 'public' AND tablename = 'action'"
                    .to_string(),
            ))
            .await?
            .is_some();

        if !exists {
            create_schema(&self.conn).await?;
            info!("Created test schema");
        }
        Ok(())
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Delete every row, children first.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        for table in TABLES {
            self.conn
                .execute(Statement::from_string(
                    DatabaseBackend::Postgres,
                    format!("DELETE FROM \"{table}\""),
                ))
                .await?;
        }
        info!("Cleaned up test database");
        Ok(())
    }
}

/// Test Redis configuration.
#[derive(Debug, Clone)]
pub struct TestRedisConfig {
    /// Redis host.
    pub host: String,
    /// Redis port.
    pub port: u16,
}

impl Default for TestRedisConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_REDIS_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_REDIS_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(6380),
        }
    }
}

impl TestRedisConfig {
    /// Get the Redis URL.
    #[must_use]
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}
