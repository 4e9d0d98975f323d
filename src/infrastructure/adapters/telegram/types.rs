//! Telegram Bot API 传输类型
//!
//! 只声明用到的字段，其余字段由 serde 忽略

use serde::{Deserialize, Serialize};

use crate::domain::{ChatEvent, ChatTarget, ChatUpdate};

/// 统一响应包装 `{"ok": .., "result": .., "description": .., "error_code": ..}`
#[derive(Debug, Deserialize)]
pub(super) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Message {
    #[allow(dead_code)]
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct User {
    #[serde(default)]
    pub username: Option<String>,
}

/// getUpdates 请求体
#[derive(Debug, Serialize)]
pub(super) struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: Vec<&'static str>,
}

/// sendMessage 请求体
#[derive(Debug, Serialize)]
pub(super) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

/// sendMessage / sendVideo 的结果，只关心成功与否
#[derive(Debug, Deserialize)]
pub(super) struct SentMessage {
    #[allow(dead_code)]
    pub message_id: i64,
}

impl Update {
    /// 转换为领域更新；非文本消息映射为 `Ignored`
    pub fn into_chat_update(self) -> ChatUpdate {
        let event = match self.message {
            Some(Message {
                chat,
                from,
                text: Some(text),
                ..
            }) => {
                let mut target = ChatTarget::new(chat.id);
                if let Some(username) = from.and_then(|u| u.username) {
                    target = target.with_username(username);
                }
                ChatEvent::classify(target, &text)
            }
            _ => ChatEvent::Ignored,
        };

        ChatUpdate {
            update_id: self.update_id,
            event,
        }
    }
}
