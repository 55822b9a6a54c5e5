//! # 通知送信
//!
//! トースト通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `Notifier` trait で通知の送信先を抽象化
//! - **2 つの実装**: ログ出力のみ（デモ・テスト用）、チャネル（画面への配送用）
//! - **fire-and-forget**: 呼び出し側は送信失敗をログに残すだけで、操作は失敗させない

mod channel;
mod logging;

use async_trait::async_trait;
pub use channel::ChannelNotifier;
use crmdash_domain::notification::{Notification, NotificationError};
pub use logging::LogNotifier;

/// 通知送信トレイト
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 通知を送信する
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationError>;
}
