//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    /// Display name shown in the UI.
    #[sea_orm(nullable)]
    pub display_name: Option<String>,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// API session token (issued at login)
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// When the current session token was issued. Tokens older than the
    /// configured session lifetime are rejected.
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub token_issued_at: Option<DateTimeWithTimeZone>,

    /// Profile picture media ID
    #[sea_orm(nullable)]
    pub profile_picture: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::media::Entity",
        from = "Column::ProfilePicture",
        to = "super::media::Column::Id",
        on_delete = "SetNull"
    )]
    ProfilePicture,

    #[sea_orm(has_many = "super::post::Entity")]
    Posts,

    #[sea_orm(has_many = "super::group_member::Entity")]
    GroupMemberships,
}

impl Related<super::media::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProfilePicture.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::group_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupMemberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
