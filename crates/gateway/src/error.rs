//! # Gateway エラー型
//!
//! 上流APIの失敗をnullに潰さず、ハンドラ境界までこの型で伝播させる。
//! HTTPステータスとボディへの対応付けは `IntoResponse` 実装で一元的に行う。

use affil_types::ErrorBody;
use axum::http::StatusCode;
use axum::Json;

/// Gatewayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 不正なリクエスト
    #[error("{0}")]
    BadRequest(String),
    /// 認証ヘッダの署名に失敗
    #[error("認証ヘッダの生成に失敗: {0}")]
    Signing(String),
    /// 上流APIが200以外を返した
    #[error("上流APIがエラーを返しました: HTTP {status}")]
    Upstream { status: u16, body: String },
    /// 上流APIとの通信に失敗
    #[error("上流APIとの通信に失敗: {0}")]
    Transport(String),
    /// 上流APIがタイムアウト
    #[error("上流APIの応答がタイムアウトしました")]
    Timeout,
    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl GatewayError {
    /// 呼び出し元に返すHTTPステータス。
    ///
    /// 上流の404はそのまま返し、それ以外の上流エラーは502にまとめる。
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Signing(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::Upstream { status: 404, .. } => StatusCode::NOT_FOUND,
            GatewayError::Upstream { .. } | GatewayError::Transport(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = match &self {
            GatewayError::Upstream {
                status: upstream_status,
                body,
            } => ErrorBody {
                error: self.to_string(),
                upstream_status: Some(*upstream_status),
                details: Some(
                    serde_json::from_str(body)
                        .unwrap_or_else(|_| serde_json::Value::String(body.clone())),
                ),
            },
            _ => ErrorBody::new(self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::BadRequest("Missing query".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::Upstream {
                status: 404,
                body: String::new()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::Upstream {
                status: 401,
                body: String::new()
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GatewayError::Upstream {
                status: 503,
                body: String::new()
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(GatewayError::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            GatewayError::Signing("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    /// BadRequestのメッセージは前置きなしでそのまま出力される
    #[test]
    fn test_bad_request_message_verbatim() {
        assert_eq!(
            GatewayError::BadRequest("Missing query".into()).to_string(),
            "Missing query"
        );
    }
}
