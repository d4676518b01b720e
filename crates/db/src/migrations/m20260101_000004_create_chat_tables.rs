//! Create `chat_room`, `chat_member`, and `chat_message` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create chat_room table
        manager
            .create_table(
                Table::create()
                    .table(ChatRoom::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatRoom::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ChatRoom::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create chat_member table
        manager
            .create_table(
                Table::create()
                    .table(ChatMember::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatMember::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChatMember::ChatId).string_len(32).not_null())
                    .col(ColumnDef::new(ChatMember::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(ChatMember::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_member_chat")
                            .from(ChatMember::Table, ChatMember::ChatId)
                            .to(ChatRoom::Table, ChatRoom::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_member_user")
                            .from(ChatMember::Table, ChatMember::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Membership is unique per room
        manager
            .create_index(
                Index::create()
                    .name("idx_chat_member_chat_user")
                    .table(ChatMember::Table)
                    .col(ChatMember::ChatId)
                    .col(ChatMember::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create chat_message table
        manager
            .create_table(
                Table::create()
                    .table(ChatMessage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatMessage::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ChatMessage::ChatId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatMessage::AuthorId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChatMessage::Content).text().not_null())
                    .col(
                        ColumnDef::new(ChatMessage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_message_chat")
                            .from(ChatMessage::Table, ChatMessage::ChatId)
                            .to(ChatRoom::Table, ChatRoom::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_message_author")
                            .from(ChatMessage::Table, ChatMessage::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_message_chat_created")
                    .table(ChatMessage::Table)
                    .col(ChatMessage::ChatId)
                    .col(ChatMessage::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChatMessage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChatMember::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChatRoom::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ChatRoom {
    Table,
    Id,
    CreatedAt,
}

#[derive(Iden)]
enum ChatMember {
    Table,
    Id,
    ChatId,
    UserId,
    JoinedAt,
}

#[derive(Iden)]
enum ChatMessage {
    Table,
    Id,
    ChatId,
    AuthorId,
    Content,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
