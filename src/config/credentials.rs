//! Credentials - 启动凭据
//!
//! 两个凭据只从进程环境读取（`.env` 由 dotenvy 预先加载），不落配置文件

use crate::application::error::BotError;

/// 模型仓库凭据环境变量
pub const HF_TOKEN_VAR: &str = "HF_TOKEN";

/// 聊天传输凭据环境变量
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";

/// 启动凭据
#[derive(Clone)]
pub struct Credentials {
    hf_token: String,
    telegram_token: String,
}

impl Credentials {
    pub fn new(hf_token: impl Into<String>, telegram_token: impl Into<String>) -> Self {
        Self {
            hf_token: hf_token.into(),
            telegram_token: telegram_token.into(),
        }
    }

    /// 通过查找函数读取；缺失或为空都视为未设置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| BotError::configuration(key))
        };

        let hf_token = read(HF_TOKEN_VAR)?;
        let telegram_token = read(TELEGRAM_TOKEN_VAR)?;

        Ok(Self {
            hf_token,
            telegram_token,
        })
    }

    pub fn hf_token(&self) -> &str {
        &self.hf_token
    }

    pub fn telegram_token(&self) -> &str {
        &self.telegram_token
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("hf_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .finish()
    }
}
