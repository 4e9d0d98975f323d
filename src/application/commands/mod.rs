//! 应用层 - 命令
//!
//! 聊天入站事件对应的命令及处理器

mod chat_commands;

pub mod handlers;

pub use chat_commands::*;
