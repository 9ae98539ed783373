//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。

use std::path::PathBuf;
use std::time::Duration;

use crate::client::ProductCatalog;

/// 上流APIのベースURL（デフォルト）
pub const DEFAULT_API_BASE_URL: &str =
    "https://developer.api.walmart.com/api-proxy/service/affil/product/v2";

/// Gatewayの起動設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// 認証設定ファイルのパス（`AFFIL_CONFIG_PATH`）
    pub config_path: PathBuf,
    /// 上流APIのベースURL（`AFFIL_API_BASE_URL`）
    pub api_base_url: String,
    /// 上流APIへのリクエストタイムアウト（`AFFIL_UPSTREAM_TIMEOUT_SECS`）
    pub upstream_timeout: Duration,
    /// リッスンアドレス（`AFFIL_BIND_ADDR`）
    pub bind_addr: String,
    /// CORSで許可するオリジン（`AFFIL_CORS_ALLOWED_ORIGINS`、カンマ区切り）
    pub cors_allowed_origins: Vec<String>,
}

impl GatewayConfig {
    /// 環境変数から設定を読み込む。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let config_path = lookup("AFFIL_CONFIG_PATH")
            .unwrap_or_else(|| "config/affil_config.json".to_string());
        let api_base_url =
            lookup("AFFIL_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let timeout_secs = match lookup("AFFIL_UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                anyhow::anyhow!("AFFIL_UPSTREAM_TIMEOUT_SECSは整数である必要があります: {e}")
            })?,
            None => 30,
        };
        if timeout_secs == 0 {
            anyhow::bail!("AFFIL_UPSTREAM_TIMEOUT_SECSは1以上である必要があります");
        }

        let bind_addr = lookup("AFFIL_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:5001".to_string());

        let cors_allowed_origins = lookup("AFFIL_CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect::<Vec<_>>();
        for origin in &cors_allowed_origins {
            validate_origin(origin)?;
        }

        Ok(Self {
            config_path: PathBuf::from(config_path),
            api_base_url,
            upstream_timeout: Duration::from_secs(timeout_secs),
            bind_addr,
            cors_allowed_origins,
        })
    }
}

/// CORSの許可オリジンが `scheme://host[:port]` 形式であることを確認する。
fn validate_origin(origin: &str) -> anyhow::Result<()> {
    if origin == "*" {
        return Ok(());
    }
    let url = reqwest::Url::parse(origin).map_err(|e| {
        anyhow::anyhow!("AFFIL_CORS_ALLOWED_ORIGINSのオリジンが不正です: {origin}: {e}")
    })?;
    let is_http = matches!(url.scheme(), "http" | "https");
    if !is_http || url.origin().ascii_serialization() != origin {
        anyhow::bail!(
            "CORSオリジンは scheme://host[:port] 形式で指定してください: {origin}"
        );
    }
    Ok(())
}

/// Gatewayの共有状態。
///
/// 起動時に一度だけ構築し、`State<Arc<GatewayState>>` として各ハンドラに渡す。
pub struct GatewayState {
    /// 商品カタログAPI（トレイトで抽象化）
    pub catalog: Box<dyn ProductCatalog>,
}
