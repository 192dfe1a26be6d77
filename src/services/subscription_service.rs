use crate::telegram::{ChatMemberStatus, ChatTransport};

/// Required chats the user is not a member of.
///
/// Lookup failures are logged and do not lock the user out.
pub async fn missing_subscriptions(
    transport: &dyn ChatTransport,
    required_chat_ids: &[String],
    user_id: i64,
) -> Vec<String> {
    let mut missing = Vec::new();
    for chat_id in required_chat_ids {
        match transport.get_chat_member_status(chat_id, user_id).await {
            Ok(ChatMemberStatus::Left | ChatMemberStatus::Kicked) => missing.push(chat_id.clone()),
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(chat_id = %chat_id, user_id, error = %err, "subscription check failed");
            }
        }
    }
    missing
}
