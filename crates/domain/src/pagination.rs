//! # ページネーション
//!
//! ページ単位でレコードを取得するための値型を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`PageToken`] | ページトークン | 次に取得するページを識別する不透明な非負整数 |
//! | [`PageRequest`] | ページ要求 | トークン + サーバー側検索クエリ |
//! | [`PageResult`] | ページ結果 | レコード列、次トークン、続きの有無 |
//!
//! ## 不変条件
//!
//! - トークンは 0 から始まり、1 つのリストセッション内で単調増加する
//! - `has_more = false` は終端であり、同じデータソースでそれ以上取得しない

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// ページトークン
///
/// 値の意味はデータソースが決める。セッションは比較（単調増加の検証）と
/// データソースへの受け渡しにのみ使用する。
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
)]
#[serde(transparent)]
pub struct PageToken(u64);

impl PageToken {
    /// 最初のページのトークン（0）
    pub fn initial() -> Self {
        Self(0)
    }

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// 連番で次のトークンを返す
    ///
    /// シード生成データソースはこの規則でトークンを払い出す。
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// `next` がこのトークンより後ろを指しているか
    pub fn is_advanced_by(&self, next: PageToken) -> bool {
        next > *self
    }
}

/// ページ要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub token: PageToken,
    /// サーバー側で適用する検索クエリ（`FilterMode::ServerQuery` 時のみ）
    pub query: Option<String>,
}

impl PageRequest {
    pub fn new(token: PageToken) -> Self {
        Self { token, query: None }
    }

    pub fn with_query(token: PageToken, query: Option<String>) -> Self {
        Self { token, query }
    }
}

/// ページ結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<T> {
    pub items:      Vec<T>,
    pub next_token: PageToken,
    pub has_more:   bool,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, next_token: PageToken, has_more: bool) -> Self {
        Self {
            items,
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
    fn test_initialは0を返す() {
        assert_eq!(PageToken::initial().as_u64(), 0);
        assert_eq!(PageToken::default(), PageToken::initial());
    }

    #[test]
    fn test_nextは1つ後ろのトークンを返す() {
        let token = PageToken::new(4);
        assert_eq!(token.next(), PageToken::new(5));
        assert!(token.is_advanced_by(token.next()));
    }

    #[test]
    fn test_同じトークンや前のトークンは前進とみなさない() {
        let token = PageToken::new(3);
        assert!(!token.is_advanced_by(PageToken::new(3)));
        assert!(!token.is_advanced_by(PageToken::new(2)));
    }

    #[test]
    fn test_nextは上限で飽和する() {
        assert_eq!(PageToken::new(u64::MAX).next(), PageToken::new(u64::MAX));
    }

    #[test]
    fn test_トークンは数値としてシリアライズされる() {
        let json = serde_json::to_value(PageToken::new(7)).unwrap();
        assert_eq!(json, serde_json::json!(7));
        assert_eq!(PageToken::new(7).to_string(), "7");
    }
}
