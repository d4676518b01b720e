//! Media repository.
//!
//! Row deletion is exposed both against the pool and against an open
//! transaction; the media service uses the latter so the stored file can be
//! removed before the delete commits.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
};
use verdant_common::{AppError, AppResult};

use crate::entities::{media, Media};

/// Repository for media operations.
#[derive(Clone)]
pub struct MediaRepository {
    db: Arc<DatabaseConnection>,
}

impl MediaRepository {
    /// Create a new media repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get reference to the database connection.
    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Find media by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<media::Model>> {
        Media::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get media by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<media::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::MediaNotFound(id.to_string()))
    }

    /// Create a new media record.
    pub async fn create(&self, model: media::ActiveModel) -> AppResult<media::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a media row inside an open transaction.
    pub async fn delete_in(&self, txn: &DatabaseTransaction, id: &str) -> AppResult<()> {
        Media::delete_by_id(id)
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::media::MediaType;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_media(id: &str, path: &str) -> media::Model {
        media::Model {
            id: id.to_string(),
            url: format!("https://example.com/media/{id}.jpg"),
            path: path.to_string(),
            uploaded_by: "usr1".to_string(),
            media_type: Some(MediaType::Image),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let media = create_test_media("med1", "/tmp/foo.jpg");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[media.clone()]])
                .into_connection(),
        );

        let repo = MediaRepository::new(db);
        let result = repo.find_by_id("med1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().path, "/tmp/foo.jpg");
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_media_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<media::Model>::new()])
                .into_connection(),
        );

        let repo = MediaRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::MediaNotFound(_))));
    }
}
