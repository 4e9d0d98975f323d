//! Chat Context - 聊天限界上下文
//!
//! 职责:
//! - 入站事件分类（/start 命令、自由文本、其余忽略）
//! - 回复目标

mod value_objects;

pub use value_objects::{ChatEvent, ChatTarget, ChatUpdate};
