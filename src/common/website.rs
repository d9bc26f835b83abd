use crate::settings::AppSettings;

/// Deep link into the frontend messaging view, used by message notifications.
pub fn get_conversation_link(conversation_id: i64) -> String {
    let frontend_base = &AppSettings::get().frontend_base_url;
    format!("{frontend_base}/messaging?conversation={conversation_id}")
}
