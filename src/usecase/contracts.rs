use crate::{
    domain::{
        comment::{CommentsCount, NewRemoteComment, RemoteComment},
        notification::Notification,
    },
    repository::errors::{ApiError, StoreError},
};

/// Remote comment store.
#[cfg_attr(test, mockall::automock)]
pub trait CommentRepository: Send + Sync {
    async fn list(
        &self,
        article_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RemoteComment>, ApiError>;
    async fn create(&self, comment: &NewRemoteComment) -> Result<RemoteComment, ApiError>;
    async fn delete(&self, comment_id: i64, user_id: i64) -> Result<(), ApiError>;
    async fn count(&self, article_id: i64) -> Result<CommentsCount, ApiError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait NotificationRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Notification>, ApiError>;
    async fn mark_as_read(&self, id: i64) -> Result<Notification, ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

/// Durable key-value medium backing the local comment cache. Values are
/// written whole; `set` must never leave a partially written value behind.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
