use crate::domain::notification::Notification;
use crate::usecase::contracts::NotificationRepository;
use crate::usecase::error::UsecaseError;

/// Pass-through over the notifications endpoints. Nothing is cached and
/// every failure reaches the caller.
pub struct NotificationsUseCase<N>
where
    N: NotificationRepository,
{
    notification_repository: N,
}

impl<N> NotificationsUseCase<N>
where
    N: NotificationRepository,
{
    pub fn new(notification_repository: N) -> Self {
        Self { notification_repository }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_notifications(&self) -> Result<Vec<Notification>, UsecaseError> {
        tracing::debug!("listing notifications");

        let notifications = self.notification_repository.list().await?;

        tracing::debug!(count = notifications.len(), "retrieved notifications");
        Ok(notifications)
    }

    #[tracing::instrument(skip(self), fields(notification_id = %id))]
    pub async fn mark_as_read(&self, id: i64) -> Result<Notification, UsecaseError> {
        tracing::debug!("marking notification as read");

        let notification = self.notification_repository.mark_as_read(id).await?;

        tracing::debug!(notification_id = %id, "notification marked as read");
        Ok(notification)
    }

    #[tracing::instrument(skip(self), fields(notification_id = %id))]
    pub async fn delete_notification(&self, id: i64) -> Result<(), UsecaseError> {
        tracing::debug!("deleting notification");

        self.notification_repository.delete(id).await?;

        tracing::info!(notification_id = %id, "notification deleted");
        Ok(())
    }
}
