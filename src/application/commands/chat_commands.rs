//! Chat Commands - 聊天入站命令

use crate::domain::{ChatTarget, Prompt, RequestId};

/// `/start` 命令
#[derive(Debug, Clone)]
pub struct StartCommand {
    pub target: ChatTarget,
}

/// 提交提示词命令
#[derive(Debug, Clone)]
pub struct SubmitPromptCommand {
    pub target: ChatTarget,
    pub prompt: Prompt,
}

/// 提交提示词响应
#[derive(Debug, Clone)]
pub struct SubmitPromptResponse {
    pub request_id: RequestId,
}
