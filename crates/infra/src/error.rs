//! # インフラ層エラー定義
//!
//! データソースとの通信で発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **エラーの変換**: `reqwest::Error`, `serde_json::Error` をラップ
//! - **再試行可否の判定**: [`InfraError::is_retryable`] でセッション側が再試行を案内できる
//! - **SpanTrace 自動捕捉**: `From` 実装や convenience constructor で
//!   エラー生成時の呼び出し経路を自動記録する
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別（Http, Status, Unavailable 等）

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別（[`InfraErrorKind`]）と [`SpanTrace`]（呼び出し経路）を保持する。
///
/// ```ignore
/// match error.kind() {
///     InfraErrorKind::Status { status, .. } if *status == 404 => { /* 未知のリソース */ }
///     _ => { /* その他 */ }
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// HTTP 通信エラー
    ///
    /// 接続失敗、タイムアウト、レスポンスボディの読み取り失敗など。
    #[error("HTTP 通信エラー: {0}")]
    Http(#[source] reqwest::Error),

    /// 2xx 以外のステータスコード
    ///
    /// `detail` はエラーボディ（RFC 9457）の `detail`、読み取れなければ本文そのもの。
    #[error("データソースがステータス {status} を返しました: {detail}")]
    Status { status: u16, detail: String },

    /// シリアライズ/デシリアライズエラー
    #[error("シリアライズエラー: {0}")]
    Serialization(#[source] serde_json::Error),

    /// データソースが一時的に利用できない
    ///
    /// シードデータソースに注入した失敗もこの種別になる。
    #[error("データソースを利用できません: {0}")]
    Unavailable(String),

    /// 入力エラー
    ///
    /// ベース URL の形式不正など、呼び出し側の設定に原因がある場合。
    #[error("入力エラー: {0}")]
    InvalidInput(String),

    /// 予期しないエラー
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

// ===== InfraError のメソッド =====

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 同じトークンで再試行して成功し得るか
    ///
    /// 通信エラー、5xx / 408 / 429、一時的な利用不可を再試行可能とみなす。
    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            InfraErrorKind::Http(_) | InfraErrorKind::Unavailable(_) => true,
            InfraErrorKind::Status { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            InfraErrorKind::Serialization(_)
            | InfraErrorKind::InvalidInput(_)
            | InfraErrorKind::Unexpected(_) => false,
        }
    }

    /// InfraError を分解して InfraErrorKind と SpanTrace を取り出す
    pub fn into_parts(self) -> (InfraErrorKind, SpanTrace) {
        (self.kind, self.span_trace)
    }

    // ===== Convenience constructors =====

    /// ステータスエラーを生成する
    pub fn status(status: u16, detail: impl Into<String>) -> Self {
        Self::from_kind(InfraErrorKind::Status {
            status,
            detail: detail.into(),
        })
    }

    /// 一時的な利用不可エラーを生成する
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::from_kind(InfraErrorKind::Unavailable(msg.into()))
    }

    /// 入力エラーを生成する
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::from_kind(InfraErrorKind::InvalidInput(msg.into()))
    }

    /// 予期しないエラーを生成する
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::from_kind(InfraErrorKind::Unexpected(msg.into()))
    }

    fn from_kind(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<reqwest::Error> for InfraError {
    fn from(source: reqwest::Error) -> Self {
        Self::from_kind(InfraErrorKind::Http(source))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(source: serde_json::Error) -> Self {
        Self::from_kind(InfraErrorKind::Serialization(source))
    }
}

impl From<url::ParseError> for InfraError {
    fn from(source: url::ParseError) -> Self {
        Self::invalid_input(format!("URL の形式が不正です: {source}"))
    }
}
