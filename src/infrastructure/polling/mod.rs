//! Polling - 入站更新分发

mod dispatcher;

pub use dispatcher::{BotDispatcher, DispatcherConfig};
