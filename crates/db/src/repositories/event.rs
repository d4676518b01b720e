//! Event repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use verdant_common::{AppError, AppResult};

use crate::entities::{event, event_participant, user, Event, EventParticipant, User};

/// Repository for event operations.
#[derive(Clone)]
pub struct EventRepository {
    db: Arc<DatabaseConnection>,
}

impl EventRepository {
    /// Create a new event repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find event by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<event::Model>> {
        Event::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get event by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<event::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event not found: {id}")))
    }

    /// Create a new event.
    pub async fn create(&self, model: event::ActiveModel) -> AppResult<event::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an event.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Event::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Check if user participates in an event.
    pub async fn is_participant(&self, user_id: &str, event_id: &str) -> AppResult<bool> {
        let count = EventParticipant::find()
            .filter(event_participant::Column::UserId.eq(user_id))
            .filter(event_participant::Column::EventId.eq(event_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Add a participant to an event.
    pub async fn add_participant(
        &self,
        model: event_participant::ActiveModel,
    ) -> AppResult<event_participant::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a participant from an event.
    pub async fn remove_participant(&self, user_id: &str, event_id: &str) -> AppResult<u64> {
        let deleted = EventParticipant::delete_many()
            .filter(event_participant::Column::UserId.eq(user_id))
            .filter(event_participant::Column::EventId.eq(event_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(deleted.rows_affected)
    }

    /// List the participants of an event, paginated.
    pub async fn participants(
        &self,
        event_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        let links = EventParticipant::find()
            .filter(event_participant::Column::EventId.eq(event_id))
            .order_by(event_participant::Column::CreatedAt, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let user_ids: Vec<String> = links.iter().map(|l| l.user_id.clone()).collect();
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_event(id: &str, group_id: &str, name: &str) -> event::Model {
        event::Model {
            id: id.to_string(),
            name: name.to_string(),
            group_id: group_id.to_string(),
            due_date: Utc::now().into(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let event = create_test_event("evt1", "grp1", "Cleanup day");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[event.clone()]])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let result = repo.find_by_id("evt1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().name, "Cleanup day");
    }

    #[tokio::test]
    async fn test_participants_empty_event() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<event_participant::Model>::new()])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let result = repo.participants("evt1", 10, 0).await.unwrap();

        assert!(result.is_empty());
    }
}
