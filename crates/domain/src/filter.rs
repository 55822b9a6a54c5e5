//! # 検索フィルタ
//!
//! リスト画面の検索ボックスに対応する部分一致フィルタと、その適用場所の切り替え。
//!
//! ## 適用場所
//!
//! | モード | 動作 | ページネーションへの影響 |
//! |---|---|---|
//! | [`FilterMode::ClientSide`] | 取得済みリストを後から絞り込む | なし（追加取得しない） |
//! | [`FilterMode::ServerQuery`] | クエリをデータソースに渡す | トークン 0 から新しいセッションを開始 |
//!
//! `ClientSide` では絞り込み結果が空でも「続きなし」を意味しない。
//! 画面側は `has_more` を別途確認する必要がある。
//!
//! ## 正規化
//!
//! 検索語は小文字化に加えて前後の空白も取り除いてから照合する。
//! 画面に表示し直す検索語は正規化前の入力をそのまま使う（`ListSnapshot::query`）。

use serde::{Deserialize, Serialize};

/// 検索フィルタの適用場所
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterMode {
    /// 取得済みリストをクライアント側で絞り込む
    #[default]
    ClientSide,
    /// サーバー側クエリとして渡し、ページネーションをやり直す
    ServerQuery,
}

/// 大文字小文字を区別しない部分一致フィルタ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    /// 前後の空白を除き、小文字化して保持する
    pub fn new(query: impl AsRef<str>) -> Self {
        Self {
            needle: query.as_ref().trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// 正規化済みの検索語
    pub fn as_str(&self) -> &str {
        &self.needle
    }

    /// データソースに渡すクエリ（空なら `None`）
    pub fn query(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.needle.clone())
    }

    /// いずれかのフィールドが検索語を含むか
    pub fn matches_any(&self, fields: &[&str]) -> bool {
        self.is_empty()
            || fields
                .iter()
                .any(|field| field.to_lowercase().contains(&self.needle))
    }
}
