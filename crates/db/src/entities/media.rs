//! Media entity (uploaded files).
//!
//! A media row owns its stored file: the two are created together and must
//! be deleted together. See `verdant_core::services::media` for the
//! transactional delete that enforces this.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of uploaded media.
///
/// The active enum constrains the column to these two values at write
/// time; anything else is rejected by the database layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum MediaType {
    /// Still image.
    #[sea_orm(string_value = "IMAGE")]
    Image,
    /// Video clip.
    #[sea_orm(string_value = "VIDEO")]
    Video,
}

impl MediaType {
    /// Derive the media type from a MIME content type, if supported.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        if content_type.starts_with("image/") {
            Some(Self::Image)
        } else if content_type.starts_with("video/") {
            Some(Self::Video)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The API URL for the media (at most 512 characters).
    pub url: String,

    /// The local path of the stored file.
    pub path: String,

    /// The user who uploaded the file. Only the uploader may delete it.
    pub uploaded_by: String,

    /// The type of media, if known.
    #[sea_orm(nullable)]
    pub media_type: Option<MediaType>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UploadedBy",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Uploader,

    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uploader.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
