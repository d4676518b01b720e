//! Group entity for user communities.
//!
//! A group always has exactly one creator and one chat room; `name`,
//! `creator_id`, and `chat_id` are all required.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Group name.
    pub name: String,

    /// User who created the group.
    #[sea_orm(indexed)]
    pub creator_id: String,

    /// Chat room owned by the group.
    #[sea_orm(unique)]
    pub chat_id: String,

    /// Group picture media ID (optional).
    #[sea_orm(nullable)]
    pub picture: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Creator,

    #[sea_orm(
        belongs_to = "super::chat_room::Entity",
        from = "Column::ChatId",
        to = "super::chat_room::Column::Id",
        on_delete = "Cascade"
    )]
    Chat,

    #[sea_orm(
        belongs_to = "super::media::Entity",
        from = "Column::Picture",
        to = "super::media::Column::Id",
        on_delete = "SetNull"
    )]
    Picture,

    #[sea_orm(has_many = "super::group_admin::Entity")]
    Admins,

    #[sea_orm(has_many = "super::group_member::Entity")]
    Members,

    #[sea_orm(has_many = "super::event::Entity")]
    Events,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::chat_room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chat.def()
    }
}

impl Related<super::group_admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Admins.def()
    }
}

impl Related<super::group_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
