use crate::common::context::Context;
use crate::entities::notifications::NewNotification;

const TABLE_NAME: &str = "notifications";

pub async fn create<C: Context>(ctx: &C, notification: NewNotification) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (user_id, type, title, body, link, unread) VALUES (?, ?, ?, ?, ?, TRUE)"
    );
    sqlx::query(QUERY)
        .bind(notification.user_id)
        .bind(notification.notification_type)
        .bind(notification.title)
        .bind(notification.body)
        .bind(notification.link)
        .execute(ctx.db())
        .await?;
    Ok(())
}
