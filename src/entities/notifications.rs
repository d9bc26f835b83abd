pub const NOTIFICATION_TYPE_MESSAGE: &str = "MESSAGE";

/// Insert arguments for the notifications table. Notification storage and
/// delivery belong to the notification service; messaging only produces rows.
#[derive(Debug)]
pub struct NewNotification {
    pub user_id: i64,
    pub notification_type: &'static str,
    pub title: String,
    pub body: String,
    pub link: String,
}
