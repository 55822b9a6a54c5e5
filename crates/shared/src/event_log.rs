//! # ビジネスイベントログとエラーコンテキストの構造化ヘルパー
//!
//! `jq` で効率的に調査できるよう、ログフィールドの命名規約とヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## エラーコンテキスト
//!
//! 既存の `tracing::warn!` / `tracing::error!` に `error.category` + `error.kind`
//! フィールドを直接追加する。定数は [`error`] モジュールで提供。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。呼び出し側のクレートが `tracing` に依存していること。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
///
/// ## 推奨フィールド
///
/// - `event.entity_type`: レコード種別（`customer`, `invoice` など）
/// - `event.entity_id`: レコード ID
/// - `list.token`: 対象のページトークン
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const LIST: &str = "list";
        pub const RECORD: &str = "record";
        pub const NOTIFICATION: &str = "notification";
    }

    /// イベントアクション
    pub mod action {
        // リストセッション
        pub const SESSION_MOUNTED: &str = "session.mounted";
        pub const SESSION_RESET: &str = "session.reset";
        pub const SESSION_UNMOUNTED: &str = "session.unmounted";
        pub const PAGE_FETCHED: &str = "page.fetched";
        pub const PAGE_FAILED: &str = "page.failed";

        // レコード操作
        pub const RECORD_CREATED: &str = "record.created";
        pub const RECORD_UPDATED: &str = "record.updated";
        pub const RECORD_DELETED: &str = "record.deleted";
        pub const RECORD_REJECTED: &str = "record.rejected";

        // 通知
        pub const NOTIFICATION_SENT: &str = "notification.sent";
        pub const NOTIFICATION_FAILED: &str = "notification.failed";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// データソース呼び出し（シード生成、HTTP API）
        pub const DATA_SOURCE: &str = "data_source";
        /// 可視性監視（センチネル）
        pub const OBSERVER: &str = "observer";
        /// ランタイム（タスク生成など）
        pub const RUNTIME: &str = "runtime";
    }

    /// エラー種別
    pub mod kind {
        pub const FETCH: &str = "fetch";
        pub const TIMEOUT: &str = "timeout";
        pub const INCONSISTENT_PAGE: &str = "inconsistent_page";
        pub const OBSERVER_SETUP: &str = "observer_setup";
        pub const SPAWN: &str = "spawn";
    }
}

#[cfg(test)]
mod tests {
    use super::event;

    #[test]
    fn test_log_business_eventマクロがコンパイルされ実行できる() {
        // subscriber 未設定でもパニックしないこと
        log_business_event!(
            event.category = event::category::LIST,
            event.action = event::action::PAGE_FETCHED,
            event.result = event::result::SUCCESS,
            list.token = 0_u64,
            "ページを取得"
        );
    }

    #[test]
    fn test_アクション定数はドット区切りである() {
        for action in [
            event::action::SESSION_MOUNTED,
            event::action::PAGE_FETCHED,
            event::action::RECORD_DELETED,
            event::action::NOTIFICATION_FAILED,
        ] {
            assert!(action.contains('.'), "ドット区切りであること: {action}");
        }
    }
}
