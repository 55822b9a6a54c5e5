//! # crmdash ダッシュボード
//!
//! CRM のリスト画面（顧客・請求書・プロジェクト・メール・アンケート）を駆動する
//! アプリケーション層。
//!
//! ## 設計方針
//!
//! - **リストセッション**: 1 画面 = 1 セッション。ページ取得・無限スクロール・
//!   フィルタ・変更操作の反映をセッション単位で管理する
//! - **依存性注入**: データソースと通知は `Arc<dyn Trait>` で外部から注入
//! - **描画境界**: 画面はスナップショット（[`usecase::ListSnapshot`]）を読むだけ
//!
//! ## モジュール構成
//!
//! - [`config`] - 環境変数からの設定読み込み
//! - [`error`] - セッションのエラー定義
//! - [`usecase`] - リストセッションと変更操作

pub mod config;
pub mod error;
pub mod usecase;
