//! テスト用のヘルパー関数群。

use std::sync::{Arc, Mutex, OnceLock};

use affil_crypto::{Credentials, RsaPrivateKey};

use crate::client::ProductCatalog;
use crate::config::GatewayState;
use crate::error::GatewayError;

/// テスト用の認証情報。RSA鍵生成が重いためプロセス内で使い回す。
pub fn test_credentials() -> Arc<Credentials> {
    static CREDENTIALS: OnceLock<Arc<Credentials>> = OnceLock::new();
    CREDENTIALS
        .get_or_init(|| {
            let key = RsaPrivateKey::new(&mut rand::rngs::OsRng, 1024).unwrap();
            Arc::new(Credentials::new("test-consumer", "1", key))
        })
        .clone()
}

/// モックカタログが受けた呼び出し
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCall {
    Search { query: String, limit: u32 },
    ProductDetails(String),
    Taxonomy,
}

/// テスト用のモックProductCatalog。
/// 上流APIへの接続なしで、呼び出しを記録して固定の結果を返す。
#[derive(Default)]
pub struct MockCatalog {
    pub calls: Arc<Mutex<Vec<CatalogCall>>>,
    /// Someの場合、全ての呼び出しが (ステータス, ボディ) のUpstreamエラーになる
    pub upstream_failure: Option<(u16, String)>,
}

impl MockCatalog {
    fn respond(&self, call: CatalogCall) -> Result<serde_json::Value, GatewayError> {
        self.calls.lock().unwrap().push(call.clone());
        if let Some((status, body)) = &self.upstream_failure {
            return Err(GatewayError::Upstream {
                status: *status,
                body: body.clone(),
            });
        }
        Ok(match call {
            CatalogCall::Search { query, limit } => serde_json::json!({
                "query": query,
                "numItems": limit,
                "items": [{"itemId": 1, "name": "mock item"}],
            }),
            CatalogCall::ProductDetails(id) => serde_json::json!({"itemId": id}),
            CatalogCall::Taxonomy => serde_json::json!({"categories": []}),
        })
    }
}

#[async_trait::async_trait]
impl ProductCatalog for MockCatalog {
    async fn search(&self, query: &str, limit: u32) -> Result<serde_json::Value, GatewayError> {
        self.respond(CatalogCall::Search {
            query: query.to_string(),
            limit,
        })
    }

    async fn get_product_details(
        &self,
        product_id: &str,
    ) -> Result<serde_json::Value, GatewayError> {
        self.respond(CatalogCall::ProductDetails(product_id.to_string()))
    }

    async fn get_taxonomy(&self) -> Result<serde_json::Value, GatewayError> {
        self.respond(CatalogCall::Taxonomy)
    }
}

/// モックカタログを持つGatewayStateを構築し、呼び出し記録と共に返す。
pub fn mock_state(
    upstream_failure: Option<(u16, &str)>,
) -> (Arc<GatewayState>, Arc<Mutex<Vec<CatalogCall>>>) {
    let catalog = MockCatalog {
        upstream_failure: upstream_failure.map(|(s, b)| (s, b.to_string())),
        ..Default::default()
    };
    let calls = catalog.calls.clone();
    (
        Arc::new(GatewayState {
            catalog: Box::new(catalog),
        }),
        calls,
    )
}
