//! # Affil Proxy 署名処理
//!
//! 上流の商品カタログAPIが要求するリクエスト署名を実装する。
//!
//! ## 署名プロトコル
//! | 手順 | 内容 |
//! |------|------|
//! | 正規化 | ヘッダ名の辞書順（ASCIIバイト順）に値をtrimし、各値の後に`\n`を付けて連結 |
//! | 署名 | RSA PKCS#1 v1.5 + SHA-256 |
//! | エンコード | Base64（Standard） |
//!
//! ヘッダ名そのものは正規化文字列に含まれない。値の並び順のみがヘッダ名で決まる。

use std::collections::BTreeMap;

use base64::Engine;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use sha2::Sha256;

pub use rsa::RsaPrivateKey;

mod credentials;

pub use credentials::{verify_auth_headers, Credentials};

/// RSA PKCS#1 v1.5 / SHA-256 署名鍵
pub type RsaSigningKey = rsa::pkcs1v15::SigningKey<Sha256>;
/// RSA PKCS#1 v1.5 / SHA-256 検証鍵
pub type RsaVerifyingKey = rsa::pkcs1v15::VerifyingKey<Sha256>;

/// 認証情報と署名処理のエラー型
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// 設定ファイルが存在しない、または内容が不正
    #[error("設定の読み込みに失敗: {0}")]
    Config(String),
    /// 秘密鍵ファイルが存在しない、読めない、または暗号化されていないRSA PEMではない
    #[error("秘密鍵の読み込みに失敗: {0}")]
    KeyLoad(String),
    /// 署名処理に失敗
    #[error("署名に失敗: {0}")]
    Signing(String),
    /// 署名検証に失敗
    #[error("署名検証に失敗しました")]
    SignatureVerify,
}

/// Base64エンジン（Standard）
pub fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

/// 署名対象フィールドを正規化文字列に変換する。
///
/// 入力の順序には依存せず、ヘッダ名の辞書順のみで出力が決まる。
/// 同一のヘッダ名が複数回現れた場合は後の値が優先される。
pub fn canonicalize<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let sorted: BTreeMap<&str, &str> = fields.into_iter().collect();
    sorted.values().fold(String::new(), |mut out, value| {
        out.push_str(value.trim());
        out.push('\n');
        out
    })
}

/// PEM形式のRSA秘密鍵を読み込む。
///
/// PKCS#8（`BEGIN PRIVATE KEY`）とPKCS#1（`BEGIN RSA PRIVATE KEY`）に対応する。
/// パスワード付きの鍵は受け付けない。
pub fn load_private_key_pem(pem: &str) -> Result<RsaPrivateKey, CredentialError> {
    if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
        return Ok(key);
    }
    RsaPrivateKey::from_pkcs1_pem(pem).map_err(|e| {
        CredentialError::KeyLoad(format!("暗号化されていないRSA秘密鍵のPEMではありません: {e}"))
    })
}

/// RSA PKCS#1 v1.5 / SHA-256 による署名。
///
/// 秘密鍵演算はブラインディング付きで行う。PKCS#1 v1.5は決定的なため、
/// 出力はブラインディングの有無によらず同一になる。
pub fn rsa_sha256_sign(
    signing_key: &RsaSigningKey,
    message: &[u8],
) -> Result<Vec<u8>, CredentialError> {
    let signature = signing_key
        .try_sign_with_rng(&mut rand::rngs::OsRng, message)
        .map_err(|e| CredentialError::Signing(e.to_string()))?;
    Ok(signature.to_vec())
}

/// RSA PKCS#1 v1.5 / SHA-256 による署名検証。
pub fn rsa_sha256_verify(
    verifying_key: &RsaVerifyingKey,
    message: &[u8],
    signature: &[u8],
) -> Result<(), CredentialError> {
    let signature = rsa::pkcs1v15::Signature::try_from(signature)
        .map_err(|_| CredentialError::SignatureVerify)?;
    verifying_key
        .verify(message, &signature)
        .map_err(|_| CredentialError::SignatureVerify)
}

/// 正規化文字列に署名し、Base64文字列で返す。
pub fn sign_canonical(
    signing_key: &RsaSigningKey,
    canonical: &str,
) -> Result<String, CredentialError> {
    let signature = rsa_sha256_sign(signing_key, canonical.as_bytes())?;
    Ok(b64().encode(signature))
}
