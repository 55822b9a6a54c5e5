//! # crmdash ドメイン層
//!
//! CRM リスト画面の中核となる、I/O を持たない純粋なモデルを定義する。
//!
//! ## 設計方針
//!
//! - **レコード**: 顧客・請求書・プロジェクト・メール・アンケートの値型
//! - **ページネーション**: ページトークンとページ結果（[`pagination`]）
//! - **状態機械**: 無限スクロールのトリガー判定（[`scroll_trigger`]）
//! - **リデューサー**: 取得済みリストへのページ追加・変更適用（[`accumulated_list`]）
//! - **コマンド / 結果**: 作成・更新・削除の検証と結果型（[`mutation`]）
//!
//! ## 依存関係の方向
//!
//! ```text
//! dashboard → infra → domain
//!      ↘        ↘
//!        shared   shared
//! ```
//!
//! ドメイン層はインフラ層（HTTP、乱数生成、非同期ランタイム）に一切依存しない。
//! そのため状態機械とリデューサーは同期的に、決定的にテストできる。
//!
//! ## 使用例
//!
//! ```rust
//! use crmdash_domain::{
//!     accumulated_list::AccumulatedList,
//!     pagination::{PageResult, PageToken},
//! };
//!
//! let mut list = AccumulatedList::new();
//! let page = PageResult::new(vec![1, 2, 3], PageToken::initial().next(), true);
//! list.append_page(page.items);
//! assert_eq!(list.len(), 3);
//! ```

#[macro_use]
mod macros;

pub mod accumulated_list;
pub mod clock;
pub mod error;
pub mod filter;
pub mod kanban;
pub mod mutation;
pub mod notification;
pub mod pagination;
pub mod record;
pub mod scroll_trigger;
pub mod value_objects;

pub use error::DomainError;
