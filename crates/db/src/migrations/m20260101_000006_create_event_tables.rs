//! Create event and `event_participant` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create event table
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Event::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Event::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Event::GroupId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Event::DueDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Event::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_group")
                            .from(Event::Table, Event::GroupId)
                            .to(Group::Table, Group::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_group_id")
                    .table(Event::Table)
                    .col(Event::GroupId)
                    .to_owned(),
            )
            .await?;

        // Create event_participant table
        manager
            .create_table(
                Table::create()
                    .table(EventParticipant::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventParticipant::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EventParticipant::EventId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventParticipant::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventParticipant::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_participant_event")
                            .from(EventParticipant::Table, EventParticipant::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_participant_user")
                            .from(EventParticipant::Table, EventParticipant::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Attendance is unique per event
        manager
            .create_index(
                Index::create()
                    .name("idx_event_participant_event_user")
                    .table(EventParticipant::Table)
                    .col(EventParticipant::EventId)
                    .col(EventParticipant::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventParticipant::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
    Name,
    GroupId,
    DueDate,
    CreatedAt,
}

#[derive(Iden)]
enum EventParticipant {
    Table,
    Id,
    EventId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Group {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
