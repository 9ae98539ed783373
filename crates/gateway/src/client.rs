//! # 商品カタログAPIクライアント
//!
//! リクエストごとに新しい署名付きヘッダを生成し、上流APIへGETリクエストを中継する。
//! 200以外の応答は診断ログを出力した上で `GatewayError::Upstream` として返す。
//! リトライは行わない。

use std::sync::Arc;

use affil_crypto::Credentials;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{StatusCode, Url};

use crate::error::GatewayError;

/// 商品カタログAPIの操作。
#[async_trait::async_trait]
pub trait ProductCatalog: Send + Sync {
    /// キーワード検索。`limit` は `numItems` としてそのまま渡す。
    async fn search(&self, query: &str, limit: u32) -> Result<serde_json::Value, GatewayError>;

    /// 商品詳細の取得
    async fn get_product_details(
        &self,
        product_id: &str,
    ) -> Result<serde_json::Value, GatewayError>;

    /// カテゴリ分類の取得
    async fn get_taxonomy(&self) -> Result<serde_json::Value, GatewayError>;
}

/// 上流APIクライアント。
pub struct AffiliateApiClient {
    http_client: reqwest::Client,
    base_url: Url,
    credentials: Arc<Credentials>,
}

impl AffiliateApiClient {
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        credentials: Arc<Credentials>,
    ) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GatewayError::Internal(format!("ベースURLが不正です: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Internal(format!(
                "ベースURLにパスを連結できません: {base_url}"
            )));
        }
        Ok(Self {
            http_client,
            base_url,
            credentials,
        })
    }

    /// ベースURLにパスセグメントを連結する。各セグメントはエスケープされる。
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Internal("ベースURLにパスを連結できません".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// 署名付きヘッダを付与してGETし、200ならJSONを返す。
    async fn get_json(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, GatewayError> {
        let headers = self
            .credentials
            .generate_auth_headers()
            .map_err(|e| GatewayError::Signing(e.to_string()))?;

        let mut request = self
            .http_client
            .get(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        for (name, value) in headers.pairs() {
            request = request.header(name, value);
        }
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Transport(format!("HTTP送信失敗: {e}"))
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Transport(format!("レスポンス読み取り失敗: {e}"))
            }
        })?;

        if status != StatusCode::OK {
            tracing::warn!(
                status = status.as_u16(),
                path = %url.path(),
                body = %body,
                "上流APIがエラーを返しました"
            );
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| GatewayError::Transport(format!("レスポンスのパースに失敗: {e}")))
    }
}

#[async_trait::async_trait]
impl ProductCatalog for AffiliateApiClient {
    async fn search(&self, query: &str, limit: u32) -> Result<serde_json::Value, GatewayError> {
        let url = self.endpoint(&["search"])?;
        self.get_json(
            url,
            &[("query", query.to_string()), ("numItems", limit.to_string())],
        )
        .await
    }

    async fn get_product_details(
        &self,
        product_id: &str,
    ) -> Result<serde_json::Value, GatewayError> {
        let url = self.endpoint(&["items", product_id])?;
        self.get_json(url, &[]).await
    }

    async fn get_taxonomy(&self) -> Result<serde_json::Value, GatewayError> {
        let url = self.endpoint(&["taxonomy"])?;
        self.get_json(url, &[]).await
    }
}
