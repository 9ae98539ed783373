//! # Affil Proxy Gateway
//!
//! 商品カタログAPIの薄いプロキシ。受けたリクエストに独自方式の署名付き
//! 認証ヘッダを付与して上流へ中継し、JSONをそのまま返す。
//!
//! ## 役割
//! - 認証設定と秘密鍵の読み込み（起動時に一度だけ）
//! - リクエストごとの署名付きヘッダ生成と上流への中継
//! - 上流エラーのHTTPステータスへの対応付け
//! - CORS
//!
//! ## API エンドポイント
//! - `GET /api/search?query=<string>&limit=<n>` — キーワード検索
//! - `GET /api/product/{product_id}` — 商品詳細
//! - `GET /api/taxonomy` — カテゴリ分類

mod client;
mod config;
mod endpoints;
mod error;
#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

use affil_crypto::Credentials;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::client::AffiliateApiClient;
use crate::config::{GatewayConfig, GatewayState};
use crate::endpoints::{handle_product, handle_search, handle_taxonomy};

/// CORSレイヤーを構築する。`*` を含む場合は全オリジンを許可する。
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let mut origins: Vec<HeaderValue> = Vec::with_capacity(allowed_origins.len());
    for origin in allowed_origins {
        match origin.parse() {
            Ok(value) => origins.push(value),
            Err(e) => tracing::warn!(origin = %origin, error = %e, "CORSオリジンを無視します"),
        }
    }
    cors.allow_origin(origins)
}

/// ルーターを構築する。
fn build_router(state: Arc<GatewayState>, allowed_origins: &[String]) -> axum::Router {
    axum::Router::new()
        .route("/api/search", axum::routing::get(handle_search))
        .route("/api/product/{product_id}", axum::routing::get(handle_product))
        .route("/api/taxonomy", axum::routing::get(handle_taxonomy))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// エントリポイント
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from_env()?;

    // 認証情報の読み込みに失敗した場合は起動しない
    let credentials = Arc::new(Credentials::from_config_file(&config.config_path)?);
    tracing::info!(
        consumer_id = %credentials.consumer_id(),
        key_version = %credentials.key_version(),
        config_path = %config.config_path.display(),
        "認証情報を読み込みました"
    );

    let http_client = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()?;
    let catalog = AffiliateApiClient::new(http_client, &config.api_base_url, credentials)?;

    let state = Arc::new(GatewayState {
        catalog: Box::new(catalog),
    });

    let app = build_router(state, &config.cors_allowed_origins);

    tracing::info!(
        upstream = %config.api_base_url,
        timeout_secs = config.upstream_timeout.as_secs(),
        "Gatewayを {} で起動します",
        config.bind_addr
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// テスト
// ---------------------------------------------------------------------------
