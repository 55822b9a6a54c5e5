//! チャネル通知実装
//!
//! 通知を tokio の mpsc チャネルへ送る。受信側（画面）が閉じていれば
//! [`NotificationError::ChannelClosed`] を返す。

use async_trait::async_trait;
use crmdash_domain::notification::{Notification, NotificationError};
use tokio::sync::mpsc;

use super::Notifier;

/// チャネル通知
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new(sender: mpsc::UnboundedSender<Notification>) -> Self {
        Self { sender }
    }

    /// 送信側と受信側をまとめて作る
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        self.sender
            .send(notification.clone())
            .map_err(|_| NotificationError::ChannelClosed)
    }
}
