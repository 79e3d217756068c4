//! Test database helper utilities
//!
//! PostgreSQL tests run against `TEST_DATABASE_URL` and are skipped when it is
//! not set. Every test starts from empty tables.

use shamebot::database::{run_migrations, DatabasePool, PgMembershipStore};
use sqlx::PgPool;
use std::sync::Once;

static INIT: Once = Once::new();

/// Test database helper that manages PostgreSQL test database setup
pub struct TestDatabase {
    pub pool: DatabasePool,
}

impl TestDatabase {
    /// Connect, migrate and truncate; `None` when no test database is configured
    pub async fn connect() -> Option<Self> {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt::try_init();
        });

        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping PostgreSQL test");
            return None;
        };

        let pool = PgPool::connect(&database_url).await.expect("Failed to connect to test database");
        run_migrations(&pool).await.expect("Failed to run migrations");

        let database = Self { pool };
        database.cleanup().await;
        Some(database)
    }

    pub fn store(&self) -> PgMembershipStore {
        PgMembershipStore::new(self.pool.clone())
    }

    /// Remove all rows, children first
    pub async fn cleanup(&self) {
        for table in ["memberships", "users", "chats"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&self.pool)
                .await
                .expect("Failed to clean table");
        }
    }

    pub async fn count_records(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count records")
    }
}
