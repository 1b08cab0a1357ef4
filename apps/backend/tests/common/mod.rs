//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up the test environment with a database
//! - Helper functions for creating test users and shaping records
//! - Authentication helpers
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL).
//! The kanji catalog is seeded from the bundled dataset on connect.

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use uuid::Uuid;

use fukushu_backend::db::Database;
use fukushu_backend::routes::auth::hash_token;
use fukushu_backend::services::catalog;
use fukushu_backend::AppState;
use srs_core::Scheduler;

/// Test context containing the database connection and the router.
///
/// Use this to set up integration tests with a real database connection.
/// Requires the DATABASE_URL environment variable to be set.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or the database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let (_, components) = catalog::initialize(&db)
            .await
            .expect("Failed to seed catalog");

        let db = Arc::new(db);
        let state = AppState {
            db: db.clone(),
            components,
            scheduler: Scheduler::default(),
        };

        let app = fukushu_backend::router(state);

        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Create a test user and return its ID and plaintext token.
    pub async fn create_test_user(&self, name: Option<&str>) -> (Uuid, String) {
        let token = Uuid::new_v4().to_string();
        let user = self
            .db
            .create_user(&hash_token(&token), name)
            .await
            .expect("Failed to create test user");
        (user.id, token)
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Look up a catalog ID by character.
    pub async fn kanji_id(&self, character: &str) -> i64 {
        self.db
            .get_kanji_by_character(character)
            .await
            .expect("Catalog lookup failed")
            .expect("Character not in catalog")
            .id
    }

    /// Backdate a user's record so the queue serves it.
    pub async fn make_due(&self, user_id: Uuid, kanji_id: i64) {
        sqlx::query(
            "UPDATE review_states SET due_at = NOW() - INTERVAL '1 hour'
             WHERE user_id = $1 AND kanji_id = $2",
        )
        .bind(user_id)
        .bind(kanji_id)
        .execute(self.db.pool())
        .await
        .expect("Failed to backdate record");
    }

    /// Clean up test data for a user. The shared catalog stays.
    ///
    /// Call this after tests to remove test data.
    pub async fn cleanup_user(&self, user_id: Uuid) {
        // Delete in order due to foreign keys
        let _ = sqlx::query("DELETE FROM review_states WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }
}

/// Percent-encode a path segment. Kanji are multi-byte, so they cannot
/// appear raw in a request URI.
pub fn encode_segment(s: &str) -> String {
    s.bytes().map(|b| format!("%{:02X}", b)).collect()
}
