//! # Affil Proxy 共有型定義
//!
//! 認証設定ファイル、署名付きヘッダ、検索パラメータ、エラーレスポンスの
//! データ構造をRust構造体として提供する。
//!
//! ## エンコーディング規則
//! - 設定ファイル: camelCaseキーのJSON
//! - 署名: Base64（Standard、パディングあり）
//! - タイムスタンプ: UNIXエポックからのミリ秒を10進文字列で表現

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// 認証ヘッダ名
// ---------------------------------------------------------------------------

/// コンシューマID ヘッダ名
pub const HEADER_CONSUMER_ID: &str = "WM_CONSUMER.ID";
/// リクエストタイムスタンプ ヘッダ名
pub const HEADER_CONSUMER_TIMESTAMP: &str = "WM_CONSUMER.INTIMESTAMP";
/// 秘密鍵バージョン ヘッダ名
pub const HEADER_KEY_VERSION: &str = "WM_SEC.KEY_VERSION";
/// 署名 ヘッダ名
pub const HEADER_AUTH_SIGNATURE: &str = "WM_SEC.AUTH_SIGNATURE";

/// 検索時のデフォルト取得件数
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

// ---------------------------------------------------------------------------
// 認証設定ファイル
// ---------------------------------------------------------------------------

/// 認証設定ファイルの内容。
///
/// `privateKeyPath` は設定ファイルの親ディレクトリからの相対パスとして解決される。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerConfig {
    /// 上流APIに登録されたコンシューマID
    pub consumer_id: String,
    /// 秘密鍵のバージョン識別子
    pub private_key_version: String,
    /// PEM形式のRSA秘密鍵ファイルへのパス
    pub private_key_path: String,
}

// ---------------------------------------------------------------------------
// 署名付きヘッダ
// ---------------------------------------------------------------------------

/// 1リクエスト分の署名付き認証ヘッダ。
///
/// タイムスタンプに束縛されるため、再利用せずリクエストごとに生成する。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignedHeaderSet {
    #[serde(rename = "WM_CONSUMER.ID")]
    pub consumer_id: String,
    /// UNIXエポックからのミリ秒（10進文字列）
    #[serde(rename = "WM_CONSUMER.INTIMESTAMP")]
    pub timestamp: String,
    #[serde(rename = "WM_SEC.KEY_VERSION")]
    pub key_version: String,
    /// Base64エンコードされたRSA署名
    #[serde(rename = "WM_SEC.AUTH_SIGNATURE")]
    pub signature: String,
}

impl SignedHeaderSet {
    /// 署名対象の3フィールドを (ヘッダ名, 値) の組で返す。
    pub fn signed_fields(&self) -> [(&'static str, &str); 3] {
        [
            (HEADER_CONSUMER_ID, self.consumer_id.as_str()),
            (HEADER_CONSUMER_TIMESTAMP, self.timestamp.as_str()),
            (HEADER_KEY_VERSION, self.key_version.as_str()),
        ]
    }

    /// 署名を含む全4フィールドを (ヘッダ名, 値) の組で返す。
    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        let [a, b, c] = self.signed_fields();
        [a, b, c, (HEADER_AUTH_SIGNATURE, self.signature.as_str())]
    }
}

// ---------------------------------------------------------------------------
// Gateway API
// ---------------------------------------------------------------------------

/// `GET /api/search` のクエリパラメータ。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    /// 検索キーワード（未指定・空文字はエラー）
    pub query: Option<String>,
    /// 取得件数（未指定時は [`DEFAULT_SEARCH_LIMIT`]）。
    /// `query` の検査より後で数値として解釈するため、ここでは文字列のまま受け取る。
    pub limit: Option<String>,
}

/// エラーレスポンスのボディ。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    /// 上流APIが返したHTTPステータス
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
    /// 上流APIのレスポンスボディ（JSONとして解釈できない場合は文字列）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            upstream_status: None,
            details: None,
        }
    }
}
