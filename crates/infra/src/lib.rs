//! # crmdash インフラ層
//!
//! 外部システムとの通信と、テスト用の決定的なデータ生成を担当する。
//!
//! ## 設計方針
//!
//! このクレートはリストセッションが消費するポート（[`DataSource`]、[`Notifier`]）と
//! その具体的な実装を提供する。セッションはトレイト越しにしか実装を知らないため、
//! HTTP とシードデータを設定だけで差し替えられる。
//!
//! ## 責務
//!
//! - **データソース**: ページトークンによるレコード取得（HTTP / シード生成）
//! - **通知**: トースト通知の送信（ログ出力 / チャネル）
//! - **テスト支援**: スクリプト化されたデータソース（`test-utils` feature）
//!
//! ## 依存関係
//!
//! ```text
//! dashboard → infra → domain
//!               ↘
//!                 shared
//! ```
//!
//! ## モジュール構成
//!
//! - [`data_source`] - ページ取得ポートと実装
//! - [`notification`] - 通知送信ポートと実装
//! - [`error`] - インフラ層エラー定義
//!
//! ## 使用例
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use crmdash_domain::{
//!     pagination::{PageRequest, PageToken},
//!     record::Email,
//! };
//! use crmdash_infra::{DataSource, SeededDataSource};
//!
//! # async fn run() -> Result<(), crmdash_infra::InfraError> {
//! let source = SeededDataSource::<Email>::new(42).with_delay(Duration::ZERO);
//! let page = source.fetch_page(&PageRequest::new(PageToken::initial())).await?;
//! assert_eq!(page.items.len(), 10);
//! # Ok(())
//! # }
//! ```

pub mod data_source;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;

pub use data_source::{DataSource, HttpDataSource, SeedRecord, SeededDataSource};
pub use error::{InfraError, InfraErrorKind};
pub use notification::{ChannelNotifier, LogNotifier, Notifier};
