//! Create group, `group_admin`, and `group_member` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create group table
        manager
            .create_table(
                Table::create()
                    .table(Group::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Group::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Group::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Group::CreatorId).string_len(32).not_null())
                    .col(ColumnDef::new(Group::ChatId).string_len(32).not_null())
                    .col(ColumnDef::new(Group::Picture).string_len(32))
                    .col(
                        ColumnDef::new(Group::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Group::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_creator")
                            .from(Group::Table, Group::CreatorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_chat")
                            .from(Group::Table, Group::ChatId)
                            .to(ChatRoom::Table, ChatRoom::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_picture")
                            .from(Group::Table, Group::Picture)
                            .to(Media::Table, Media::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_group_creator_id")
                    .table(Group::Table)
                    .col(Group::CreatorId)
                    .to_owned(),
            )
            .await?;

        // Each chat room backs at most one group
        manager
            .create_index(
                Index::create()
                    .name("idx_group_chat_id")
                    .table(Group::Table)
                    .col(Group::ChatId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create group_admin table
        manager
            .create_table(
                Table::create()
                    .table(GroupAdmin::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupAdmin::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupAdmin::GroupId).string_len(32).not_null())
                    .col(ColumnDef::new(GroupAdmin::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(GroupAdmin::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_admin_group")
                            .from(GroupAdmin::Table, GroupAdmin::GroupId)
                            .to(Group::Table, Group::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_admin_user")
                            .from(GroupAdmin::Table, GroupAdmin::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A user is at most one admin row per group
        manager
            .create_index(
                Index::create()
                    .name("idx_group_admin_group_user")
                    .table(GroupAdmin::Table)
                    .col(GroupAdmin::GroupId)
                    .col(GroupAdmin::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create group_member table
        manager
            .create_table(
                Table::create()
                    .table(GroupMember::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupMember::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GroupMember::GroupId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupMember::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupMember::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_member_group")
                            .from(GroupMember::Table, GroupMember::GroupId)
                            .to(Group::Table, Group::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_member_user")
                            .from(GroupMember::Table, GroupMember::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A user is at most one member row per group
        manager
            .create_index(
                Index::create()
                    .name("idx_group_member_group_user")
                    .table(GroupMember::Table)
                    .col(GroupMember::GroupId)
                    .col(GroupMember::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GroupMember::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupAdmin::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Group::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Group {
    Table,
    Id,
    Name,
    CreatorId,
    ChatId,
    Picture,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum GroupAdmin {
    Table,
    Id,
    GroupId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum GroupMember {
    Table,
    Id,
    GroupId,
    UserId,
    JoinedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum ChatRoom {
    Table,
    Id,
}

#[derive(Iden)]
enum Media {
    Table,
    Id,
}
