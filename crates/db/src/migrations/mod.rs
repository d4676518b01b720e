//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20260101_000001_create_user_table;
mod m20260101_000002_create_media_table;
mod m20260101_000003_add_profile_picture_to_user;
mod m20260101_000004_create_chat_tables;
mod m20260101_000005_create_group_tables;
mod m20260101_000006_create_event_tables;
mod m20260101_000007_create_post_table;
mod m20260101_000008_add_token_issued_at_to_user;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_user_table::Migration),
            Box::new(m20260101_000002_create_media_table::Migration),
            Box::new(m20260101_000003_add_profile_picture_to_user::Migration),
            Box::new(m20260101_000004_create_chat_tables::Migration),
            Box::new(m20260101_000005_create_group_tables::Migration),
            Box::new(m20260101_000006_create_event_tables::Migration),
            Box::new(m20260101_000007_create_post_table::Migration),
            Box::new(m20260101_000008_add_token_issued_at_to_user::Migration),
        ]
    }
}
