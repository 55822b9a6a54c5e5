//! # エラーレスポンス（RFC 9457 Problem Details）
//!
//! データ API が返す共通のエラーレスポンス構造体。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - HTTP データソースは非 2xx 応答の本文をこの型として解釈し、`detail` をエラーに載せる
//! - よく使うエラー種別は便利コンストラクタで提供し、URI のハードコードを排除

use serde::{Deserialize, Serialize};

/// error_type URI のベースパス
const ERROR_TYPE_BASE: &str = "https://crmdash.example.com/errors";

/// エラーレスポンス（RFC 9457 Problem Details）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title:      String,
    pub status:     u16,
    pub detail:     String,
}

impl ErrorResponse {
    /// 汎用コンストラクタ
    ///
    /// `error_type_suffix` はベース URI に付加される（例: `"invalid-token"`）。
    pub fn new(
        error_type_suffix: &str,
        title: impl Into<String>,
        status: u16,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            error_type: format!("{ERROR_TYPE_BASE}/{error_type_suffix}"),
            title: title.into(),
            status,
            detail: detail.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new("bad-request", "Bad Request", 400, detail)
    }

    /// 404 Not Found
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new("not-found", "Not Found", 404, detail)
    }

    /// 500 Internal Server Error
    ///
    /// detail は固定値（内部情報を漏らさないため）。
    pub fn internal_error() -> Self {
        Self::new(
            "internal-error",
            "Internal Server Error",
            500,
            "内部エラーが発生しました",
        )
    }

    /// 503 Service Unavailable
    pub fn service_unavailable(detail: impl Into<String>) -> Self {
        Self::new("service-unavailable", "Service Unavailable", 503, detail)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_new_で全フィールドが正しく設定される() {
        let error = ErrorResponse::new("invalid-token", "Invalid Token", 400, "トークンが不正です");

        assert_eq!(
            error.error_type,
            "https://crmdash.example.com/errors/invalid-token"
        );
        assert_eq!(error.title, "Invalid Token");
        assert_eq!(error.status, 400);
        assert_eq!(error.detail, "トークンが不正です");
    }

    #[test]
    fn test_service_unavailable_が503を返す() {
        let error = ErrorResponse::service_unavailable("メンテナンス中");

        assert_eq!(error.status, 503);
        assert_eq!(
            error.error_type,
            "https://crmdash.example.com/errors/service-unavailable"
        );
    }

    #[test]
    fn test_typeフィールドがリネームされてシリアライズされる() {
        let json = serde_json::to_value(ErrorResponse::not_found("ページがありません")).unwrap();

        assert_eq!(json["type"], "https://crmdash.example.com/errors/not-found");
        assert!(json.get("error_type").is_none());
    }
}
