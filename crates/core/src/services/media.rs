//! Media service.
//!
//! A media row and its stored file live and die together. Deletion removes
//! the file before the row delete commits; if the file cannot be removed,
//! the transaction rolls back and the row stays.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{Set, TransactionTrait};
use verdant_common::{storage::storage_key, AppError, AppResult, IdGenerator, StorageBackend};
use verdant_db::entities::media::{self, MediaType};
use verdant_db::repositories::MediaRepository;

/// Maximum file size (64MB).
pub const MAX_FILE_SIZE: usize = 64 * 1024 * 1024;

/// Maximum length of the stored URL column.
pub const MAX_URL_LENGTH: usize = 512;

/// Input for creating a new media record.
pub struct CreateMediaInput {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Service for managing uploaded media.
#[derive(Clone)]
pub struct MediaService {
    media_repo: MediaRepository,
    storage: Arc<dyn StorageBackend>,
    id_gen: IdGenerator,
}

impl MediaService {
    /// Create a new media service.
    #[must_use]
    pub fn new(media_repo: MediaRepository, storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            media_repo,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a media record by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<media::Model> {
        self.media_repo.get_by_id(id).await
    }

    /// Upload a new file and create its media record.
    pub async fn upload(
        &self,
        uploader_id: &str,
        input: CreateMediaInput,
    ) -> AppResult<media::Model> {
        if input.data.is_empty() {
            return Err(AppError::BadRequest("File is empty".to_string()));
        }
        if input.data.len() > MAX_FILE_SIZE {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {MAX_FILE_SIZE} bytes"
            )));
        }

        // Only the two enumerated kinds are accepted.
        let media_type = MediaType::from_content_type(&input.content_type).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Unsupported media type: {}",
                input.content_type
            ))
        })?;

        let file_id = self.id_gen.generate();
        let key = storage_key(&file_id, &input.name);

        let url = self.storage.public_url(&key);
        if url.len() > MAX_URL_LENGTH {
            return Err(AppError::Validation(format!(
                "Media URL exceeds {MAX_URL_LENGTH} characters"
            )));
        }

        let path = self.storage.save(&key, &input.data).await?;

        let model = media::ActiveModel {
            id: Set(file_id),
            url: Set(url),
            path: Set(path.to_string_lossy().into_owned()),
            uploaded_by: Set(uploader_id.to_string()),
            media_type: Set(Some(media_type)),
            created_at: Set(Utc::now().into()),
        };

        let created = self.media_repo.create(model).await?;

        tracing::info!(media_id = %created.id, path = %created.path, "Media uploaded");

        Ok(created)
    }

    /// Delete a media record together with its stored file.
    ///
    /// Only the uploader may delete. The row is deleted inside a
    /// transaction, then the file is removed; the transaction only commits
    /// after the file is gone. A storage failure rolls the row delete back
    /// and is returned to the caller.
    pub async fn delete(&self, actor_id: &str, id: &str) -> AppResult<()> {
        let media = self.media_repo.get_by_id(id).await?;

        if media.uploaded_by != actor_id {
            return Err(AppError::Forbidden(
                "Only the uploader may delete media".to_string(),
            ));
        }

        let txn = self
            .media_repo
            .db()
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.media_repo.delete_in(&txn, id).await?;

        if let Err(e) = self.storage.remove(Path::new(&media.path)).await {
            tracing::warn!(
                media_id = %id,
                path = %media.path,
                error = %e,
                "File removal failed, aborting media delete"
            );
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Err(e);
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(media_id = %id, "Media deleted");

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    /// In-memory storage double; optionally fails on remove.
    struct FakeStorage {
        removed: Mutex<Vec<PathBuf>>,
        fail_remove: bool,
    }

    impl FakeStorage {
        fn new(fail_remove: bool) -> Arc<Self> {
            Arc::new(Self {
                removed: Mutex::new(vec![]),
                fail_remove,
            })
        }
    }

    #[async_trait::async_trait]
    impl StorageBackend for FakeStorage {
        async fn save(&self, key: &str, _data: &[u8]) -> AppResult<PathBuf> {
            Ok(PathBuf::from(format!("/tmp/{key}")))
        }

        async fn remove(&self, path: &Path) -> AppResult<()> {
            if self.fail_remove {
                return Err(AppError::Storage("permission denied".to_string()));
            }
            self.removed.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("/media/{key}")
        }
    }

    fn create_test_media(id: &str, uploaded_by: &str, path: &str) -> media::Model {
        media::Model {
            id: id.to_string(),
            url: format!("/media/{id}.jpg"),
            path: path.to_string(),
            uploaded_by: uploaded_by.to_string(),
            media_type: Some(MediaType::Image),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_type() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = MediaService::new(MediaRepository::new(db), FakeStorage::new(false));

        let result = svc
            .upload(
                "usr1",
                CreateMediaInput {
                    name: "song.mp3".to_string(),
                    content_type: "audio/mpeg".to_string(),
                    data: vec![1, 2, 3],
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_file() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = MediaService::new(MediaRepository::new(db), FakeStorage::new(false));

        let result = svc
            .upload(
                "usr1",
                CreateMediaInput {
                    name: "empty.png".to_string(),
                    content_type: "image/png".to_string(),
                    data: vec![],
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_row() {
        let media = create_test_media("med1", "usr1", "/tmp/foo.jpg");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[media]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let storage = FakeStorage::new(false);
        let svc = MediaService::new(MediaRepository::new(db), storage.clone());

        svc.delete("usr1", "med1").await.unwrap();

        let removed = storage.removed.lock().unwrap();
        assert_eq!(removed.as_slice(), &[PathBuf::from("/tmp/foo.jpg")]);
    }

    #[tokio::test]
    async fn test_delete_by_non_uploader_is_forbidden() {
        let media = create_test_media("med1", "usr1", "/tmp/foo.jpg");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[media]])
                .into_connection(),
        );
        let storage = FakeStorage::new(false);
        let svc = MediaService::new(MediaRepository::new(db), storage.clone());

        let result = svc.delete("usr2", "med1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(storage.removed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_aborts_when_file_removal_fails() {
        let media = create_test_media("med1", "usr1", "/tmp/foo.jpg");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[media]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let svc = MediaService::new(MediaRepository::new(db), FakeStorage::new(true));

        let result = svc.delete("usr1", "med1").await;

        assert!(matches!(result, Err(AppError::Storage(_))));
    }
}
