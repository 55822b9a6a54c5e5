//! # 通知
//!
//! 画面右下に表示されるトースト通知のドメインモデル。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 発生源 |
//! |---|------------|------|
//! | [`Notification`] | 通知 | 変更操作の成功・失敗、ページ取得の失敗 |
//! | [`NotificationLevel`] | 通知レベル | 成功 / 情報 / エラー |
//!
//! ## 設計方針
//!
//! - **fire-and-forget**: 通知の送信失敗は変更操作の結果に影響しない
//! - **送信経路の分離**: 通知の組み立てはドメイン層、送信は `Notifier`（インフラ層）

use serde::Serialize;
use thiserror::Error;

use crate::{
    DomainError,
    mutation::{MutationKind, MutationOutcome},
    record::Record,
};

/// 通知送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// 受信側がすでに閉じている
    #[error("通知チャネルが閉じています")]
    ChannelClosed,
}

/// 通知レベル
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// 通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level:       NotificationLevel,
    pub title:       String,
    pub description: String,
}

impl Notification {
    pub fn new(
        level: NotificationLevel,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }

    /// 変更操作の成功通知
    pub fn from_outcome<T: Record>(outcome: &MutationOutcome<T>) -> Self {
        let kind_name = T::KIND.display_name();
        let label = outcome.record().display_label();

        let (title, verb) = match outcome.kind() {
            MutationKind::Create => ("作成しました", "作成"),
            MutationKind::Update => ("更新しました", "更新"),
            MutationKind::Delete => ("削除しました", "削除"),
        };

        Self::new(
            NotificationLevel::Success,
            format!("{kind_name}を{title}"),
            format!("「{label}」を{verb}しました"),
        )
    }

    /// 変更操作の失敗通知
    pub fn from_rejection<T: Record>(kind: MutationKind, error: &DomainError) -> Self {
        let verb = match kind {
            MutationKind::Create => "作成",
            MutationKind::Update => "更新",
            MutationKind::Delete => "削除",
        };

        Self::new(
            NotificationLevel::Error,
            format!("{}の{verb}に失敗しました", T::KIND.display_name()),
            error.to_string(),
        )
    }

    /// ページ取得の失敗通知
    pub fn fetch_failed(detail: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, "読み込みに失敗しました", detail)
    }
}
