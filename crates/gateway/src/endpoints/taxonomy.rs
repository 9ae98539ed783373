//! # GET /api/taxonomy

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::config::GatewayState;
use crate::error::GatewayError;

/// GET /api/taxonomy — 上流のカテゴリ分類APIへ中継する。
pub async fn handle_taxonomy(
    State(state): State<Arc<GatewayState>>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let result = state.catalog.get_taxonomy().await?;
    Ok(Json(result))
}
