use sqlx::{query_as, PgPool};
use crate::models::notification::{Notification, NotificationPayload};
use crate::middleware::error_handling::Result;

pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_notification(&self, payload: &NotificationPayload) -> Result<Notification> {
        let notification = query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, notification_type, title, message, related_id, related_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, notification_type, title, message, related_id, related_type, is_read, created_at
            "#
        )
        .bind(payload.user_id)
        .bind(payload.notification_type.as_str())
        .bind(&payload.title)
        .bind(&payload.message)
        .bind(payload.related_id)
        .bind(&payload.related_type)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "Notification created: type={}, user={}",
            notification.notification_type,
            notification.user_id
        );

        Ok(notification)
    }
}
