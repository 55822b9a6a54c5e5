//! ログ出力のみの通知実装
//!
//! 通知を画面に配送せず、構造化ログとして出力する。

use async_trait::async_trait;
use crmdash_domain::notification::{Notification, NotificationError};

use super::Notifier;

/// ログ出力のみの通知
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        tracing::info!(
            notification.level = %notification.level,
            notification.title = %notification.title,
            notification.description = %notification.description,
            "通知"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crmdash_domain::notification::NotificationLevel;

    use super::*;

    #[tokio::test]
    async fn test_notifyがエラーを返さない() {
        let notification = Notification::new(NotificationLevel::Info, "テスト", "本文");

        let result = LogNotifier.notify(&notification).await;

        assert!(result.is_ok());
    }
}
