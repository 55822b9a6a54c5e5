//! # ページネーション付きレスポンス
//!
//! ページトークン方式のページネーションに対応した API レスポンス型。
//! HTTP データソースが受け取るワイヤ形式であり、テスト用サーバーも同じ型で応答する。

use serde::{Deserialize, Serialize};

/// ページネーション付きレスポンス
///
/// ## JSON 形式
///
/// ```json
/// {
///   "data": [...],
///   "next_token": 3,
///   "has_more": true
/// }
/// ```
///
/// `has_more` が `false` の場合は最後のページを意味し、
/// `next_token` はそれ以降参照されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data:       Vec<T>,
    pub next_token: u64,
    pub has_more:   bool,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, next_token: u64, has_more: bool) -> Self {
        Self {
            data,
            next_token,
            has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_serializeでワイヤ形式のjsonになる() {
        let response = PaginatedResponse::new(vec!["a", "b"], 2, true);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "data": ["a", "b"], "next_token": 2, "has_more": true })
        );
    }

    #[test]
    fn test_has_moreが欠けたjsonはデシリアライズに失敗する() {
        let json = r#"{"data": [], "next_token": 1}"#;
        let result = serde_json::from_str::<PaginatedResponse<String>>(json);

        assert!(result.is_err());
    }

    #[test]
    fn test_最終ページのjsonをデシリアライズできる() {
        let json = r#"{"data": [1, 2, 3], "next_token": 5, "has_more": false}"#;
        let response: PaginatedResponse<i32> = serde_json::from_str(json).unwrap();

        assert_eq!(response.data, vec![1, 2, 3]);
        assert_eq!(response.next_token, 5);
        assert!(!response.has_more);
    }
}
