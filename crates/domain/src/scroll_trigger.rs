//! # 無限スクロールのトリガー
//!
//! リスト末尾のセンチネルの可視性から「いつ次のページを要求するか」を決める状態機械。
//! I/O は持たず、取得の実行はリストセッションが担う。
//!
//! ## 状態遷移
//!
//! ```text
//!            センチネルが可視 かつ 続きあり
//!   ┌──────┐ ─────────────────────────────▶ ┌───────┐
//!   │ Idle │                                │ Armed │
//!   └──────┘ ◀───────────────────────────── └───────┘
//!      ▲   ▲        センチネルが不可視           │ intersect / request
//!      │   │                                   ▼  （取得を 1 回だけ発行）
//!      │   │   完了: 不可視 or 続きなし    ┌──────────┐
//!      │   └──────────────────────────── │ Fetching │
//!      │                                 └──────────┘
//!      │         完了: 可視 かつ 続きあり      │
//!      └──────────── Armed へ再武装 ◀─────────┘
//! ```
//!
//! 状態はフラグ（取得中・可視・続きの有無・監視状態）から導出するため、
//! 矛盾した組み合わせは表現できない。
//!
//! ## 不変条件
//!
//! - 取得中に届いた交差通知は無視する（キューにも積まない）
//! - `has_more` が一度 `false` になったら、以降は可視性に関わらず `Idle`
//! - 監視を解除（アンマウント）した後の通知はすべて無視する
//! - 監視を確立できなかった場合は可視性による取得は起きない（明示的な要求は可能）

use serde::Serialize;

/// トリガーの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TriggerState {
    /// センチネルが不可視、または続きがない
    Idle,
    /// センチネルが可視、続きがあり、取得中ではない
    Armed,
    /// 次ページの取得が 1 件だけ進行中
    Fetching,
}

/// センチネルの可視性監視の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ObserverStatus {
    /// 監視中
    Observing,
    /// 監視を確立できなかった（センチネル未マウントなど）
    Unavailable,
    /// 監視を解除した（アンマウント済み）
    Detached,
}

/// 取得を発行しなかった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// 既に取得中
    InFlight,
    /// 続きのページがない
    Exhausted,
    /// 可視性監視が使えない
    NotObserving,
    /// 監視を解除済み
    Detached,
}

/// イベントに対するトリガーの判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    /// 取得を 1 回発行する（トリガーは `Fetching` に遷移済み）
    Dispatch,
    /// 取得しない
    Skip(SkipReason),
}

/// 無限スクロールのトリガー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollTrigger {
    fetching: bool,
    visible:  bool,
    has_more: bool,
    observer: ObserverStatus,
}

impl Default for ScrollTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollTrigger {
    /// 監視中・不可視・続きありの初期状態
    pub fn new() -> Self {
        Self {
            fetching: false,
            visible:  false,
            has_more: true,
            observer: ObserverStatus::Observing,
        }
    }

    /// 可視性監視を確立できなかったトリガー
    ///
    /// 恒久的に `Idle` のままになる。明示的な [`request`](Self::request) のみ受け付ける。
    pub fn without_observer() -> Self {
        Self {
            observer: ObserverStatus::Unavailable,
            ..Self::new()
        }
    }

    pub fn state(&self) -> TriggerState {
        if self.fetching {
            TriggerState::Fetching
        } else if self.has_more && self.visible && self.observer == ObserverStatus::Observing {
            TriggerState::Armed
        } else {
            TriggerState::Idle
        }
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn observer(&self) -> ObserverStatus {
        self.observer
    }

    /// センチネルの可視性の変化を記録する
    ///
    /// 取得は発行しない（`Idle` ⇄ `Armed` の遷移のみ）。
    /// 監視中でなければ無視する。
    pub fn set_visible(&mut self, visible: bool) -> TriggerState {
        if self.observer == ObserverStatus::Observing {
            self.visible = visible;
        }
        self.state()
    }

    /// センチネルの交差通知（可視領域への進入）
    ///
    /// センチネルを可視として記録し、取得可能なら `Fetching` に遷移して
    /// [`TriggerAction::Dispatch`] を返す。
    pub fn intersect(&mut self) -> TriggerAction {
        match self.observer {
            ObserverStatus::Observing => {}
            ObserverStatus::Unavailable => return TriggerAction::Skip(SkipReason::NotObserving),
            ObserverStatus::Detached => return TriggerAction::Skip(SkipReason::Detached),
        }
        self.visible = true;
        self.begin()
    }

    /// 明示的な取得要求（初回ロード、「さらに読み込む」ボタン、再試行）
    ///
    /// 可視性や監視の確立状況に関係なく、単一取得の制約と終端のみを確認する。
    pub fn request(&mut self) -> TriggerAction {
        if self.observer == ObserverStatus::Detached {
            return TriggerAction::Skip(SkipReason::Detached);
        }
        self.begin()
    }

    fn begin(&mut self) -> TriggerAction {
        if self.fetching {
            return TriggerAction::Skip(SkipReason::InFlight);
        }
        if !self.has_more {
            return TriggerAction::Skip(SkipReason::Exhausted);
        }
        self.fetching = true;
        TriggerAction::Dispatch
    }

    /// 取得成功で `Fetching` を抜ける
    ///
    /// 一度終端に達したら、後から `has_more = true` が来ても終端のまま。
    pub fn settle(&mut self, has_more: bool) -> TriggerState {
        self.fetching = false;
        self.has_more = self.has_more && has_more;
        self.state()
    }

    /// 取得失敗で `Fetching` を抜ける
    ///
    /// 続きの有無は変えない。可視なら `Armed` に戻り、同じトークンで再試行できる。
    pub fn settle_failed(&mut self) -> TriggerState {
        self.fetching = false;
        self.state()
    }

    /// 新しいページネーションセッションのために続きありへ戻す
    ///
    /// 可視性と監視状態は引き継ぐ。進行中の取得は呼び出し側が破棄する。
    pub fn reset(&mut self) -> TriggerState {
        self.fetching = false;
        self.has_more = true;
        self.state()
    }

    /// 可視性監視を確立できなかったことを記録する
    ///
    /// 以降は可視性による取得が起きない。解除済みなら何もしない。
    pub fn observer_unavailable(&mut self) -> TriggerState {
        if self.observer == ObserverStatus::Observing {
            self.observer = ObserverStatus::Unavailable;
            self.visible = false;
        }
        self.state()
    }

    /// 可視性監視を解除する（アンマウント）
    pub fn detach(&mut self) {
        self.observer = ObserverStatus::Detached;
        self.visible = false;
        self.fetching = false;
    }
}
