//! Command Handlers 实现

mod chat_command_handlers;

pub use chat_command_handlers::*;
