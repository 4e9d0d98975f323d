//! Startup Bootstrap - 凭据校验与模型加载
//!
//! 两个凭据都齐备之后才会发起任何网络请求

use std::sync::Arc;

use crate::application::error::BotError;
use crate::application::ports::{ModelLoaderPort, VideoModelPort};
use crate::config::Credentials;

/// 启动产物
pub struct Bootstrapped {
    pub credentials: Credentials,
    pub model: Arc<dyn VideoModelPort>,
}

/// 读取凭据并加载模型
///
/// `lookup` 按名称读取配置值（生产环境为进程环境变量）。任一凭据缺失时
/// 直接返回 `Configuration` 错误，不会调用 `loader`。
pub async fn bootstrap<F>(
    lookup: F,
    loader: &dyn ModelLoaderPort,
    model_id: &str,
) -> Result<Bootstrapped, BotError>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = Credentials::from_lookup(lookup).map_err(|e| {
        tracing::error!(error = %e, "Credential check failed");
        e
    })?;

    tracing::info!(model = %model_id, "Loading model");
    let model = loader
        .load(credentials.hf_token(), model_id)
        .await
        .map_err(|e| {
            tracing::error!(model = %model_id, error = %e, "Error loading the model");
            BotError::model_unavailable(model_id, e)
        })?;

    tracing::info!(model = %model.model_id(), "Model loaded successfully");

    Ok(Bootstrapped { credentials, model })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HF_TOKEN_VAR, TELEGRAM_TOKEN_VAR};
    use crate::test_support::CountingModelLoader;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn test_missing_hf_token_aborts_before_loading() {
        let loader = CountingModelLoader::new();
        let result = bootstrap(
            lookup_from(&[(TELEGRAM_TOKEN_VAR, "123:abc")]),
            &loader,
            "VideoCrafter/VideoCrafter2",
        )
        .await;

        assert!(matches!(result, Err(BotError::Configuration { ref key }) if key == HF_TOKEN_VAR));
        assert_eq!(loader.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_telegram_token_aborts_before_loading() {
        let loader = CountingModelLoader::new();
        let result = bootstrap(
            lookup_from(&[(HF_TOKEN_VAR, "hf_secret")]),
            &loader,
            "VideoCrafter/VideoCrafter2",
        )
        .await;

        assert!(
            matches!(result, Err(BotError::Configuration { ref key }) if key == TELEGRAM_TOKEN_VAR)
        );
        assert_eq!(loader.calls(), 0);
    }

    #[tokio::test]
    async fn test_loads_model_once_with_hf_token() {
        let loader = CountingModelLoader::new();
        let booted = bootstrap(
            lookup_from(&[(HF_TOKEN_VAR, "hf_secret"), (TELEGRAM_TOKEN_VAR, "123:abc")]),
            &loader,
            "VideoCrafter/VideoCrafter2",
        )
        .await
        .unwrap();

        assert_eq!(loader.calls(), 1);
        assert_eq!(loader.last_token().as_deref(), Some("hf_secret"));
        assert_eq!(booted.model.model_id(), "VideoCrafter/VideoCrafter2");
        assert_eq!(booted.credentials.telegram_token(), "123:abc");
    }

    #[tokio::test]
    async fn test_loader_failure_is_model_unavailable() {
        let loader = CountingModelLoader::failing();
        let result = bootstrap(
            lookup_from(&[(HF_TOKEN_VAR, "hf_secret"), (TELEGRAM_TOKEN_VAR, "123:abc")]),
            &loader,
            "VideoCrafter/VideoCrafter2",
        )
        .await;

        assert!(matches!(result, Err(BotError::ModelUnavailable { .. })));
    }
}
