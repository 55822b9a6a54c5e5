//! # セッションエラー定義
//!
//! リストセッションと変更操作で発生するエラー。
//!
//! ## 設計方針
//!
//! - **取得失敗はセッションを壊さない**: どのエラーでも取得中状態は解除され、
//!   取得済みリストは変更されない
//! - **再試行可否**: [`SessionError::is_retryable`] で「再試行」ボタンの表示を判断できる
//! - **二重取得はエラーではない**: 単一取得の制約による見送りは
//!   `SkipReason` として返し、ここには含めない

use std::time::Duration;

use crmdash_domain::{DomainError, pagination::PageToken};
use crmdash_infra::InfraError;
use thiserror::Error;

/// リストセッションで発生するエラー
#[derive(Debug, Error)]
pub enum SessionError {
    /// データソースがエラーを返した
    #[error("トークン {token} のページ取得に失敗しました: {source}")]
    Fetch {
        token:  PageToken,
        #[source]
        source: InfraError,
    },

    /// 取得がタイムアウトした
    #[error("トークン {token} のページ取得が {}ms でタイムアウトしました", .timeout.as_millis())]
    Timeout { token: PageToken, timeout: Duration },

    /// `next_token` が要求トークンより先に進んでいない
    #[error("トークン {token} の応答の next_token ({next}) が進んでいません")]
    InconsistentPage { token: PageToken, next: PageToken },

    /// 取得タスクを起動できなかった（非同期ランタイム外での呼び出しなど）
    #[error("取得タスクを起動できません: {0}")]
    Spawn(String),

    /// 変更操作の検証に失敗した
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl SessionError {
    /// 同じトークンで再試行して成功し得るか
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch { source, .. } => source.is_retryable(),
            Self::Timeout { .. } => true,
            Self::InconsistentPage { .. } | Self::Spawn(_) | Self::Domain(_) => false,
        }
    }

    /// 失敗したページトークン（取得以外のエラーは `None`）
    pub fn token(&self) -> Option<PageToken> {
        match self {
            Self::Fetch { token, .. }
            | Self::Timeout { token, .. }
            | Self::InconsistentPage { token, .. } => Some(*token),
            Self::Spawn(_) | Self::Domain(_) => None,
        }
    }

    /// ログ用のエラー種別（`error.kind`）
    pub fn log_kind(&self) -> &'static str {
        use crmdash_shared::event_log::error::kind;

        match self {
            Self::Fetch { .. } => kind::FETCH,
            Self::Timeout { .. } => kind::TIMEOUT,
            Self::InconsistentPage { .. } => kind::INCONSISTENT_PAGE,
            Self::Spawn(_) => kind::SPAWN,
            Self::Domain(_) => "domain",
        }
    }
}
