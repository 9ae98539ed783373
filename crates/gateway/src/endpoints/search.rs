//! # GET /api/search
//!
//! キーワード検索の中継。

use std::sync::Arc;

use affil_types::{SearchParams, DEFAULT_SEARCH_LIMIT};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use crate::config::GatewayState;
use crate::error::GatewayError;

/// GET /api/search — 上流の検索APIへ中継する。
///
/// `query` が未指定または空文字の場合は、`limit` の内容に関わらず400 `Missing query` を返す。
/// `limit` は上限チェックなしで `numItems` として渡す。
pub async fn handle_search(
    State(state): State<Arc<GatewayState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let Query(params) = params.map_err(|e| GatewayError::BadRequest(e.body_text()))?;

    let query = params
        .query
        .filter(|q| !q.is_empty())
        .ok_or_else(|| GatewayError::BadRequest("Missing query".to_string()))?;
    let limit = match params.limit.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_SEARCH_LIMIT,
        Some(raw) => raw.parse::<u32>().map_err(|e| {
            GatewayError::BadRequest(format!("limitは0以上の整数である必要があります: {e}"))
        })?,
    };

    tracing::debug!(query = %query, limit, "検索リクエストを受信");

    let result = state.catalog.search(&query, limit).await?;

    let count = result
        .get("items")
        .and_then(serde_json::Value::as_array)
        .map_or(0, Vec::len);
    tracing::debug!(query = %query, count, "検索結果");

    Ok(Json(result))
}
