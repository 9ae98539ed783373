//! # 認証情報と署名付きヘッダ生成
//!
//! 設定ファイルから読み込んだコンシューマIDと秘密鍵を保持し、
//! リクエストごとにタイムスタンプ付きの署名ヘッダを生成する。
//!
//! 読み込み後は不変のため、ロックなしで複数のリクエストから共有できる。

use std::fmt;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use affil_types::{
    ConsumerConfig, SignedHeaderSet, HEADER_CONSUMER_ID, HEADER_CONSUMER_TIMESTAMP,
    HEADER_KEY_VERSION,
};
use base64::Engine;
use rsa::signature::Keypair;

use crate::{
    b64, canonicalize, load_private_key_pem, rsa_sha256_verify, sign_canonical,
    CredentialError, RsaPrivateKey, RsaSigningKey, RsaVerifyingKey,
};

/// 上流API向けの認証情報。
pub struct Credentials {
    consumer_id: String,
    key_version: String,
    signing_key: RsaSigningKey,
}

impl Credentials {
    pub fn new(
        consumer_id: impl Into<String>,
        key_version: impl Into<String>,
        private_key: RsaPrivateKey,
    ) -> Self {
        Self {
            consumer_id: consumer_id.into(),
            key_version: key_version.into(),
            signing_key: RsaSigningKey::new(private_key),
        }
    }

    /// JSON設定ファイルから認証情報を読み込む。
    ///
    /// 秘密鍵のパスは設定ファイルの親ディレクトリを基準に解決する。
    pub fn from_config_file(config_path: &Path) -> Result<Self, CredentialError> {
        let raw = std::fs::read_to_string(config_path).map_err(|e| {
            CredentialError::Config(format!("{} を読み込めません: {e}", config_path.display()))
        })?;
        let config: ConsumerConfig = serde_json::from_str(&raw).map_err(|e| {
            CredentialError::Config(format!("{} のパースに失敗: {e}", config_path.display()))
        })?;

        let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_config(&config, base_dir)
    }

    /// 解析済みの設定から認証情報を構築する。
    pub fn from_config(config: &ConsumerConfig, base_dir: &Path) -> Result<Self, CredentialError> {
        for (name, value) in [
            ("consumerId", &config.consumer_id),
            ("privateKeyVersion", &config.private_key_version),
            ("privateKeyPath", &config.private_key_path),
        ] {
            if value.trim().is_empty() {
                return Err(CredentialError::Config(format!("{name} が空です")));
            }
        }

        let key_path = base_dir.join(&config.private_key_path);
        let pem = std::fs::read_to_string(&key_path).map_err(|e| {
            CredentialError::KeyLoad(format!("{} を読み込めません: {e}", key_path.display()))
        })?;
        let private_key = load_private_key_pem(&pem)?;

        Ok(Self::new(
            config.consumer_id.clone(),
            config.private_key_version.clone(),
            private_key,
        ))
    }

    pub fn consumer_id(&self) -> &str {
        &self.consumer_id
    }

    pub fn key_version(&self) -> &str {
        &self.key_version
    }

    /// 署名検証用の公開鍵
    pub fn verifying_key(&self) -> RsaVerifyingKey {
        self.signing_key.verifying_key()
    }

    /// 現在時刻で署名付きヘッダを生成する。
    pub fn generate_auth_headers(&self) -> Result<SignedHeaderSet, CredentialError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CredentialError::Signing(format!("システム時刻が不正です: {e}")))?;
        let timestamp_ms = u64::try_from(now.as_millis())
            .map_err(|_| CredentialError::Signing("タイムスタンプが範囲外です".to_string()))?;
        self.generate_auth_headers_at(timestamp_ms)
    }

    /// 指定したタイムスタンプ（UNIXエポックからのミリ秒）で署名付きヘッダを生成する。
    pub fn generate_auth_headers_at(
        &self,
        timestamp_ms: u64,
    ) -> Result<SignedHeaderSet, CredentialError> {
        let timestamp = timestamp_ms.to_string();
        let canonical = canonicalize([
            (HEADER_CONSUMER_ID, self.consumer_id.as_str()),
            (HEADER_CONSUMER_TIMESTAMP, timestamp.as_str()),
            (HEADER_KEY_VERSION, self.key_version.as_str()),
        ]);
        let signature = sign_canonical(&self.signing_key, &canonical)?;

        Ok(SignedHeaderSet {
            consumer_id: self.consumer_id.clone(),
            timestamp,
            key_version: self.key_version.clone(),
            signature,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_id", &self.consumer_id)
            .field("key_version", &self.key_version)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

/// 署名付きヘッダの署名を公開鍵で検証する。
///
/// ヘッダの値から正規化文字列を再構築し、`WM_SEC.AUTH_SIGNATURE` と照合する。
pub fn verify_auth_headers(
    verifying_key: &RsaVerifyingKey,
    headers: &SignedHeaderSet,
) -> Result<(), CredentialError> {
    let canonical = canonicalize(headers.signed_fields());
    let signature = b64()
        .decode(&headers.signature)
        .map_err(|_| CredentialError::SignatureVerify)?;
    rsa_sha256_verify(verifying_key, canonical.as_bytes(), &signature)
}
