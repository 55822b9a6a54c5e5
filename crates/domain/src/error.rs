//! # ドメイン層エラー定義
//!
//! 必須項目の欠落やレコードの不在など、ドメイン固有の例外状態を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//! - **通知への変換**: 変更操作の失敗はそのままエラー通知の本文になる
//!
//! ## 使用例
//!
//! ```rust
//! use crmdash_domain::DomainError;
//!
//! fn require_name(name: &str) -> Result<(), DomainError> {
//!     if name.is_empty() {
//!         return Err(DomainError::Validation("名前は必須です".to_string()));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_name("").is_err());
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 必須項目の未入力、文字数制限の超過など。
    /// 必須チェック以上の検証は行わない。
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// レコードが見つからない
    ///
    /// 更新・削除の対象 ID が取得済みリストに存在しない場合に使用する。
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// レコードの種類（"Customer", "Invoice" など）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },

    /// 競合エラー
    ///
    /// 作成しようとした ID が取得済みリストに既に存在する場合に使用する。
    #[error("競合が発生しました: {0}")]
    Conflict(String),
}
