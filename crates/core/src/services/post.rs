//! Post service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use verdant_common::{AppError, AppResult, IdGenerator, Page};
use verdant_db::entities::post;
use verdant_db::repositories::PostRepository;

use crate::services::media::MediaService;

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 8192))]
    pub content: String,
    pub media_id: Option<String>,
}

/// Service for managing posts.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    media_service: MediaService,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(post_repo: PostRepository, media_service: MediaService) -> Self {
        Self {
            post_repo,
            media_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a post by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// Create a post, optionally attaching an existing media record.
    pub async fn create(&self, author_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        if let Some(ref media_id) = input.media_id {
            // Attachment must exist and belong to the author;
            // MediaNotFound propagates otherwise.
            let media = self.media_service.get_by_id(media_id).await?;
            if media.uploaded_by != author_id {
                return Err(AppError::Forbidden(
                    "Cannot attach another user's media".to_string(),
                ));
            }
        }

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            content: Set(input.content),
            media_id: Set(input.media_id),
            created_at: Set(Utc::now().into()),
        };

        let created = self.post_repo.create(model).await?;

        tracing::info!(post_id = %created.id, author_id = %author_id, "Post created");

        Ok(created)
    }

    /// Delete a post. Only the author may do this; attached media is
    /// deleted along with its stored file.
    pub async fn delete(&self, actor_id: &str, post_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if post.author_id != actor_id {
            return Err(AppError::Forbidden("Not your post".to_string()));
        }

        self.post_repo.delete(post_id).await?;

        if let Some(media_id) = post.media_id {
            self.media_service.delete(actor_id, &media_id).await?;
        }

        Ok(())
    }

    /// List posts by an author, newest first.
    pub async fn by_author(&self, author_id: &str, page: Page) -> AppResult<Vec<post::Model>> {
        self.post_repo
            .find_by_author(author_id, page.limit(), page.offset())
            .await
    }

    /// Global feed, newest first.
    pub async fn feed(&self, page: Page) -> AppResult<Vec<post::Model>> {
        self.post_repo.feed(page.limit(), page.offset()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, MockDatabase};
    use verdant_common::StorageBackend;
    use verdant_db::repositories::MediaRepository;

    struct NoopStorage;

    #[async_trait::async_trait]
    impl StorageBackend for NoopStorage {
        async fn save(&self, key: &str, _data: &[u8]) -> AppResult<PathBuf> {
            Ok(PathBuf::from(format!("/tmp/{key}")))
        }

        async fn remove(&self, _path: &Path) -> AppResult<()> {
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("/media/{key}")
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> PostService {
        let db = Arc::new(db);
        PostService::new(
            PostRepository::new(db.clone()),
            MediaService::new(MediaRepository::new(db), Arc::new(NoopStorage)),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_empty_content() {
        let svc = service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = svc
            .create(
                "usr1",
                CreatePostInput {
                    content: String::new(),
                    media_id: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_media_attachment() {
        let media = verdant_db::entities::media::Model {
            id: "med1".to_string(),
            url: "/media/med1.jpg".to_string(),
            path: "/tmp/med1.jpg".to_string(),
            uploaded_by: "usr2".to_string(),
            media_type: Some(verdant_db::entities::media::MediaType::Image),
            created_at: Utc::now().into(),
        };

        let svc = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[media]])
                .into_connection(),
        );

        let result = svc
            .create(
                "usr1",
                CreatePostInput {
                    content: "check out this photo".to_string(),
                    media_id: Some("med1".to_string()),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_author_is_forbidden() {
        let post = post::Model {
            id: "pst1".to_string(),
            author_id: "usr1".to_string(),
            content: "hello".to_string(),
            media_id: None,
            created_at: Utc::now().into(),
        };

        let svc = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );

        let result = svc.delete("usr2", "pst1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
