//! Create media table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Media::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Media::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Media::Url).string_len(512).not_null())
                    .col(ColumnDef::new(Media::Path).string_len(1024).not_null())
                    .col(ColumnDef::new(Media::UploadedBy).string_len(32).not_null())
                    // Constrained to IMAGE | VIDEO by the active enum.
                    .col(ColumnDef::new(Media::MediaType).string_len(16))
                    .col(
                        ColumnDef::new(Media::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_media_uploaded_by")
                            .from(Media::Table, Media::UploadedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Media::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Media {
    Table,
    Id,
    Url,
    Path,
    UploadedBy,
    MediaType,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
