//! # GET /api/product/{product_id}
//!
//! 商品詳細の中継。

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::config::GatewayState;
use crate::error::GatewayError;

/// GET /api/product/{product_id} — 上流の商品詳細APIへ中継する。
pub async fn handle_product(
    State(state): State<Arc<GatewayState>>,
    Path(product_id): Path<String>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    tracing::debug!(product_id = %product_id, "商品詳細リクエストを受信");
    let result = state.catalog.get_product_details(&product_id).await?;
    Ok(Json(result))
}
