//! # ユースケース層
//!
//! リスト画面の振る舞いを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: データソース・通知・時計を `Arc<dyn Trait>` で外部から注入
//! - **セッション単位の状態**: 取得済みリストとトリガーはセッションが排他的に所有する
//!
//! ## モジュール構成
//!
//! - `list_session`: ページ取得・無限スクロール・フィルタ
//! - `mutation`: 作成・更新・削除と通知

pub mod list_session;
pub mod mutation;

pub use list_session::{
    DispatchOutcome,
    FetchFailure,
    FetchOutcome,
    ListSession,
    ListSnapshot,
    SentinelHandle,
    SessionConfig,
};
pub use mutation::{MutationPolicy, MutationService};
