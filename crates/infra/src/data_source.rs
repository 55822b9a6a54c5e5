//! # データソース
//!
//! リストセッションが消費する唯一の外部インターフェース。
//! ページトークンを受け取り、1 ページ分のレコードを返す。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `DataSource<T>` でレコード取得を抽象化する
//! - **2 つの実装**: HTTP（本番用）、シード生成（デモ・テスト用）
//! - **再試行安全**: 同じトークンでの再取得は同じページを返す前提で設計する
//!
//! ## 契約
//!
//! | 項目 | 内容 |
//! |------|------|
//! | トークン | 0 から始まり、`next_token` でのみ進める（飛ばさない） |
//! | 終端 | 有限のデータは最終的に `has_more = false` を返す |
//! | 失敗 | そのトークンについてエラーを返す。同じトークンで再試行できる |

mod http;
mod seeded;

use async_trait::async_trait;
use crmdash_domain::{
    pagination::{PageRequest, PageResult},
    record::Record,
};
pub use http::HttpDataSource;
pub use seeded::{SeedContext, SeedRecord, SeededDataSource};

use crate::error::InfraError;

/// ページ取得トレイト
#[async_trait]
pub trait DataSource<T: Record>: Send + Sync {
    /// 1 ページ分のレコードを取得する
    ///
    /// `request.query` はサーバー側フィルタ用。対応しない実装は無視してよい。
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult<T>, InfraError>;
}
