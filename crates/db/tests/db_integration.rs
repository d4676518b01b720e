//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `verdant_test`)
//!   `TEST_DB_PASSWORD` (default: `verdant_test`)
//!   `TEST_DB_NAME` (default: `verdant_test`)

#![allow(clippy::unwrap_used)]

use sea_orm::ActiveValue::Set;
use verdant_db::entities::user;
use verdant_db::repositories::UserRepository;
use verdant_db::test_utils::{TestDatabase, TestDbConfig};

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_migrations_apply() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    db.migrate().await.expect("Migrations failed");
    db.drop_database().await.expect("Drop failed");
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_user_round_trip() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    db.migrate().await.expect("Migrations failed");

    let repo = UserRepository::new(db.conn.clone());
    let id = "01hqtestuserintegration001".to_string();
    let created = repo
        .create(user::ActiveModel {
            id: Set(id.clone()),
            username: Set("integration".to_string()),
            display_name: Set(None),
            email: Set("integration@example.com".to_string()),
            password_hash: Set("hash".to_string()),
            token: Set(None),
            token_issued_at: Set(None),
            profile_picture: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        })
        .await
        .expect("Create failed");
    assert_eq!(created.username, "integration");

    let fetched = repo.get_by_id(&id).await.expect("Fetch failed");
    assert_eq!(fetched.email, "integration@example.com");

    db.cleanup().await.expect("Cleanup failed");
    db.drop_database().await.expect("Drop failed");
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("5432"));
    assert!(url.contains("testuser"));
    assert!(url.contains("testdb"));
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.ends_with("/postgres"));
}
