use crate::{
    domain::notification::{Notification, NotificationUpdate},
    repository::{errors::ApiError, http::ApiClient},
    usecase::contracts::NotificationRepository,
};

/// Notifications endpoints; every call needs the user's bearer token.
pub struct HttpNotificationRepository {
    api: ApiClient,
}

impl HttpNotificationRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn require_token(&self) -> Result<(), ApiError> {
        if self.api.token().is_none() {
            tracing::warn!("notifications requested without a session token");
            return Err(ApiError::Unauthorized);
        }
        Ok(())
    }
}

impl NotificationRepository for HttpNotificationRepository {
    async fn list(&self) -> Result<Vec<Notification>, ApiError> {
        self.require_token()?;
        self.api
            .send_json(self.api.get("/api/notificaciones/"))
            .await
    }

    async fn mark_as_read(&self, id: i64) -> Result<Notification, ApiError> {
        self.require_token()?;
        let request = self
            .api
            .put(&format!("/api/notificaciones/{id}"))
            .json(&NotificationUpdate { read: true });
        self.api.send_json(request).await
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.require_token()?;
        self.api
            .send(self.api.delete(&format!("/api/notificaciones/{id}")))
            .await
            .map(|_| ())
    }
}
