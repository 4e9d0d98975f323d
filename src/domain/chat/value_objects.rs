//! Chat Context - Value Objects

use crate::domain::generation::Prompt;

/// 回复目标（入站消息所在的会话）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTarget {
    pub chat_id: i64,
    /// 发送者用户名，仅用于日志
    pub username: Option<String>,
}

impl ChatTarget {
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

impl std::fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.username {
            Some(name) => write!(f, "{} (@{})", self.chat_id, name),
            None => write!(f, "{}", self.chat_id),
        }
    }
}

/// 入站事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// `/start` 命令
    Start { target: ChatTarget },
    /// 非命令的文本消息
    Text { target: ChatTarget, prompt: Prompt },
    /// 其他命令、非文本消息等
    Ignored,
}

impl ChatEvent {
    /// 按文本内容分类
    ///
    /// `/start` 与 `/start@botname` 视为开始命令；其余以 `/` 开头的文本视为
    /// 未注册命令并忽略。
    pub fn classify(target: ChatTarget, text: &str) -> Self {
        if let Some(command) = text.strip_prefix('/') {
            let name = command
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .split('@')
                .next()
                .unwrap_or_default();
            return if name == "start" {
                ChatEvent::Start { target }
            } else {
                ChatEvent::Ignored
            };
        }

        match Prompt::new(text) {
            Ok(prompt) => ChatEvent::Text { target, prompt },
            Err(_) => ChatEvent::Ignored,
        }
    }
}

/// 传输层投递的一条更新
#[derive(Debug, Clone)]
pub struct ChatUpdate {
    /// 单调递增的更新序号，用于确认已处理
    pub update_id: i64,
    pub event: ChatEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ChatTarget {
        ChatTarget::new(42)
    }

    #[test]
    fn test_classify_start() {
        assert_eq!(
            ChatEvent::classify(target(), "/start"),
            ChatEvent::Start { target: target() }
        );
        assert_eq!(
            ChatEvent::classify(target(), "/start@vid_bot payload"),
            ChatEvent::Start { target: target() }
        );
    }

    #[test]
    fn test_classify_other_commands_are_ignored() {
        assert_eq!(ChatEvent::classify(target(), "/help"), ChatEvent::Ignored);
        assert_eq!(ChatEvent::classify(target(), "/"), ChatEvent::Ignored);
    }

    #[test]
    fn test_classify_text() {
        let event = ChatEvent::classify(target(), "a red fox running in snow");
        match event {
            ChatEvent::Text { target: t, prompt } => {
                assert_eq!(t.chat_id, 42);
                assert_eq!(prompt.as_str(), "a red fox running in snow");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_classify_empty_text_is_ignored() {
        assert_eq!(ChatEvent::classify(target(), ""), ChatEvent::Ignored);
    }

    #[test]
    fn test_target_display() {
        assert_eq!(target().to_string(), "42");
        assert_eq!(target().with_username("alice").to_string(), "42 (@alice)");
    }
}
