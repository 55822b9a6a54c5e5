//! # リストセッション
//!
//! 1 つのリスト画面に対応し、ページ取得・無限スクロール・検索フィルタ・
//! 変更操作の反映を 1 か所で管理する。
//!
//! ## 設計方針
//!
//! - **単一取得**: 取得の発行可否は [`ScrollTrigger`] だけが決める。
//!   同時に進行する取得は常に 0 件か 1 件で、トークンは昇順にしか進まない
//! - **ロックを await に持ち越さない**: 状態は `std::sync::Mutex` で守り、
//!   取得はロックの外で別タスクとして実行する
//! - **遅れて届いた応答は捨てる**: 取得タスクはセッションを `Weak` でしか参照せず、
//!   リセットのたびに進む世代番号が一致しない応答は反映しない
//! - **失敗してもリストは変わらない**: 取得失敗・タイムアウトは `last_error` に記録し、
//!   同じトークンで再試行できる
//!
//! ## 画面との境界
//!
//! | 画面 → セッション | セッション → 画面 |
//! |---|---|
//! | [`SentinelHandle::visibility_changed`] / [`SentinelHandle::intersect`] | [`ListSnapshot`] |
//! | [`ListSession::fetch_next_page`]（「さらに読み込む」・再試行） | `has_more` / `is_fetching_next_page` |
//! | [`ListSession::set_query`]（検索ボックス） | `last_error` |

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use chrono::{DateTime, Utc};
use crmdash_domain::{
    DomainError,
    accumulated_list::AccumulatedList,
    filter::{FilterMode, SearchFilter},
    mutation::{Mutation, MutationOutcome},
    pagination::{PageRequest, PageResult, PageToken},
    record::Record,
    scroll_trigger::{ObserverStatus, ScrollTrigger, SkipReason, TriggerAction, TriggerState},
};
use crmdash_infra::{DataSource, InfraError};
use crmdash_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};
use tokio::{
    sync::{Notify, oneshot},
    task::JoinHandle,
    time::error::Elapsed,
};

use crate::error::SessionError;

/// 1 回の取得のタイムアウト（既定値）
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// セッションの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub fetch_timeout: Duration,
    pub filter_mode:   FilterMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            filter_mode:   FilterMode::default(),
        }
    }
}

/// 取得要求の受付結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 指定トークンの取得を開始した
    Dispatched(PageToken),
    /// 取得しなかった
    Skipped(SkipReason),
}

/// 取得の完了結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// ページを末尾に追加した
    Appended {
        token:    PageToken,
        count:    usize,
        has_more: bool,
    },
    /// 取得しなかった
    Skipped(SkipReason),
    /// リセットまたはアンマウントで応答を捨てた
    Discarded,
}

/// 画面に表示する取得エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// 失敗したトークン（再試行で同じトークンを取得する）
    pub token:     Option<PageToken>,
    pub message:   String,
    pub retryable: bool,
}

impl From<&SessionError> for FetchFailure {
    fn from(error: &SessionError) -> Self {
        Self {
            token:     error.token(),
            message:   error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}

/// 描画用のスナップショット
#[derive(Debug, Clone)]
pub struct ListSnapshot<T> {
    /// 表示するレコード（クライアント側フィルタ適用後）
    pub items:                 Vec<T>,
    /// 取得済みの件数（フィルタ適用前）
    pub loaded_count:          usize,
    pub pages_loaded:          usize,
    pub next_token:            PageToken,
    pub has_more:              bool,
    /// 初回ページの取得中
    pub is_loading:            bool,
    /// 2 ページ目以降の取得中
    pub is_fetching_next_page: bool,
    pub trigger_state:         TriggerState,
    pub observer:              ObserverStatus,
    /// 入力された検索語（正規化前）
    pub query:                 String,
    pub last_error:            Option<FetchFailure>,
}

impl<T> ListSnapshot<T> {
    /// 「これ以上ありません」を表示するか
    pub fn is_end_of_list(&self) -> bool {
        !self.has_more && !self.is_loading && !self.is_fetching_next_page
    }
}

type FetchReply = oneshot::Receiver<Result<FetchOutcome, SessionError>>;

/// 取得要求の内部結果
enum Started {
    Dispatched(PageToken, FetchReply),
    Skipped(SkipReason),
}

impl Started {
    fn into_outcome(self) -> DispatchOutcome {
        match self {
            Self::Dispatched(token, _) => DispatchOutcome::Dispatched(token),
            Self::Skipped(reason) => DispatchOutcome::Skipped(reason),
        }
    }
}

struct SessionState<T> {
    list:       AccumulatedList<T>,
    trigger:    ScrollTrigger,
    next_token: PageToken,
    /// リセットのたびに進む
    generation: u64,
    filter:     SearchFilter,
    /// 入力されたままの検索語（表示用）
    query:      String,
    is_loading: bool,
    last_error: Option<FetchFailure>,
    in_flight:  Option<JoinHandle<()>>,
    unmounted:  bool,
}

impl<T> SessionState<T> {
    fn new() -> Self {
        Self {
            list:       AccumulatedList::new(),
            trigger:    ScrollTrigger::new(),
            next_token: PageToken::initial(),
            generation: 0,
            filter:     SearchFilter::default(),
            query:      String::new(),
            is_loading: false,
            last_error: None,
            in_flight:  None,
            unmounted:  false,
        }
    }

    fn apply_page(&mut self, token: PageToken, page: PageResult<T>) -> FetchOutcome {
        let count = page.items.len();
        self.list.append_page(page.items);
        self.next_token = page.next_token;
        self.trigger.settle(page.has_more);

        FetchOutcome::Appended {
            token,
            count,
            has_more: self.trigger.has_more(),
        }
    }
}

struct SessionInner<T: Record> {
    source:  Arc<dyn DataSource<T>>,
    config:  SessionConfig,
    state:   Mutex<SessionState<T>>,
    settled: Notify,
}

impl<T: Record> SessionInner<T> {
    fn lock(&self) -> MutexGuard<'_, SessionState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn server_query(&self, state: &SessionState<T>) -> Option<String> {
        match self.config.filter_mode {
            FilterMode::ServerQuery => state.filter.query(),
            FilterMode::ClientSide => None,
        }
    }

    /// トリガーの判定が `Dispatch` なら取得タスクを起動する
    fn dispatch(
        self: &Arc<Self>,
        state: &mut SessionState<T>,
        action: TriggerAction,
    ) -> Result<Started, SessionError> {
        if let TriggerAction::Skip(reason) = action {
            tracing::trace!(%reason, "取得を見送り");
            return Ok(Started::Skipped(reason));
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                state.trigger.settle_failed();
                let error = SessionError::Spawn(e.to_string());
                tracing::error!(
                    error.category = log_error::category::RUNTIME,
                    error.kind = log_error::kind::SPAWN,
                    error = %error,
                    "取得タスクを起動できません"
                );
                state.last_error = Some(FetchFailure::from(&error));
                return Err(error);
            }
        };

        let token = state.next_token;
        let generation = state.generation;
        let request = PageRequest::with_query(token, self.server_query(state));
        state.is_loading = state.list.pages_loaded() == 0;
        state.last_error = None;

        let (reply_tx, reply_rx) = oneshot::channel();
        let weak = Arc::downgrade(self);
        let source = Arc::clone(&self.source);
        let timeout = self.config.fetch_timeout;

        tracing::debug!(list.kind = T::KIND.resource(), list.token = %token, "ページ取得を開始");
        state.in_flight = Some(runtime.spawn(async move {
            let result = tokio::time::timeout(timeout, source.fetch_page(&request)).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let outcome = inner.complete(generation, token, result);
            let _ = reply_tx.send(outcome);
        }));

        Ok(Started::Dispatched(token, reply_rx))
    }

    /// 取得タスクの結果をセッションに反映する
    fn complete(
        &self,
        generation: u64,
        token: PageToken,
        result: Result<Result<PageResult<T>, InfraError>, Elapsed>,
    ) -> Result<FetchOutcome, SessionError> {
        let outcome = {
            let mut state = self.lock();
            if state.unmounted || state.generation != generation {
                tracing::debug!(list.token = %token, "破棄されたセッションへの応答を捨てる");
                return Ok(FetchOutcome::Discarded);
            }
            state.in_flight = None;
            state.is_loading = false;

            let page = match result {
                Ok(Ok(page)) if token.is_advanced_by(page.next_token) => Ok(page),
                Ok(Ok(page)) => Err(SessionError::InconsistentPage {
                    token,
                    next: page.next_token,
                }),
                Ok(Err(source)) => Err(SessionError::Fetch { token, source }),
                Err(_) => Err(SessionError::Timeout {
                    token,
                    timeout: self.config.fetch_timeout,
                }),
            };

            match page {
                Ok(page) => Ok(state.apply_page(token, page)),
                Err(error) => {
                    state.trigger.settle_failed();
                    state.last_error = Some(FetchFailure::from(&error));
                    Err(error)
                }
            }
        };
        self.settled.notify_waiters();

        match &outcome {
            Ok(FetchOutcome::Appended {
                count, has_more, ..
            }) => {
                log_business_event!(
                    event.category = event::category::LIST,
                    event.action = event::action::PAGE_FETCHED,
                    event.entity_type = T::KIND.resource(),
                    event.result = event::result::SUCCESS,
                    list.token = %token,
                    list.count = count,
                    list.has_more = has_more,
                    "ページを取得"
                );
            }
            Err(error) => {
                tracing::warn!(
                    error.category = log_error::category::DATA_SOURCE,
                    error.kind = error.log_kind(),
                    error = %error,
                    "ページ取得に失敗"
                );
                log_business_event!(
                    event.category = event::category::LIST,
                    event.action = event::action::PAGE_FAILED,
                    event.entity_type = T::KIND.resource(),
                    event.result = event::result::FAILURE,
                    list.token = %token,
                    list.retryable = error.is_retryable(),
                    "ページ取得に失敗"
                );
            }
            Ok(_) => {}
        }

        outcome
    }

    /// 取得済みリストを捨て、トークン 0 から取得し直す
    fn reset(self: &Arc<Self>, state: &mut SessionState<T>) -> Result<Started, SessionError> {
        if state.unmounted {
            return Ok(Started::Skipped(SkipReason::Detached));
        }
        if let Some(handle) = state.in_flight.take() {
            handle.abort();
        }
        state.generation += 1;
        state.list.clear();
        state.next_token = PageToken::initial();
        state.trigger.reset();
        state.last_error = None;
        state.is_loading = false;

        log_business_event!(
            event.category = event::category::LIST,
            event.action = event::action::SESSION_RESET,
            event.entity_type = T::KIND.resource(),
            event.result = event::result::SUCCESS,
            list.generation = state.generation,
            "セッションをリセット"
        );

        let action = state.trigger.request();
        self.dispatch(state, action)
    }
}

/// リストセッション
///
/// ドロップするとアンマウントされ、進行中の取得は中断される。
pub struct ListSession<T: Record> {
    inner: Arc<SessionInner<T>>,
}

impl<T: Record> ListSession<T> {
    /// セッションを開始し、トークン 0 の取得を発行する
    ///
    /// 非同期ランタイムの外で呼ばれた場合は取得を開始できず、
    /// スナップショットの `last_error` にその旨が記録される。
    pub fn mount(source: Arc<dyn DataSource<T>>, config: SessionConfig) -> Self {
        let session = Self {
            inner: Arc::new(SessionInner {
                source,
                config,
                state: Mutex::new(SessionState::new()),
                settled: Notify::new(),
            }),
        };

        log_business_event!(
            event.category = event::category::LIST,
            event.action = event::action::SESSION_MOUNTED,
            event.entity_type = T::KIND.resource(),
            event.result = event::result::SUCCESS,
            list.filter_mode = %config.filter_mode,
            "リストセッションを開始"
        );

        let started = {
            let mut state = session.inner.lock();
            let action = state.trigger.request();
            session.inner.dispatch(&mut state, action)
        };
        if let Err(error) = started {
            tracing::debug!(error = %error, "初回ページの取得を開始できませんでした");
        }

        session
    }

    /// 次のページの取得を要求する（「さらに読み込む」ボタン・再試行）
    ///
    /// 完了を待たずに戻る。取得中・終端・アンマウント済みなら何もしない。
    pub fn fetch_next_page(&self) -> Result<DispatchOutcome, SessionError> {
        let mut state = self.inner.lock();
        let action = state.trigger.request();
        self.inner
            .dispatch(&mut state, action)
            .map(Started::into_outcome)
    }

    /// 次のページを取得し、完了まで待つ
    pub async fn load_next_page(&self) -> Result<FetchOutcome, SessionError> {
        let started = {
            let mut state = self.inner.lock();
            let action = state.trigger.request();
            self.inner.dispatch(&mut state, action)?
        };

        match started {
            Started::Skipped(reason) => Ok(FetchOutcome::Skipped(reason)),
            Started::Dispatched(_, reply) => reply.await.unwrap_or(Ok(FetchOutcome::Discarded)),
        }
    }

    /// 進行中の取得が終わるまで待つ
    pub async fn wait_until_settled(&self) {
        loop {
            let notified = self.inner.settled.notified();
            let fetching = self.inner.lock().trigger.is_fetching();
            if !fetching {
                return;
            }
            notified.await;
        }
    }

    /// センチネル（リスト末尾の可視性監視）のハンドル
    pub fn sentinel(&self) -> SentinelHandle<T> {
        SentinelHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// 可視性監視を確立できなかったことを記録する
    ///
    /// 以降は可視性による取得は起きず、[`fetch_next_page`](Self::fetch_next_page) のみ有効。
    pub fn report_observer_unavailable(&self, reason: &str) {
        let state = self.inner.lock().trigger.observer_unavailable();
        tracing::warn!(
            error.category = log_error::category::OBSERVER,
            error.kind = log_error::kind::OBSERVER_SETUP,
            reason,
            trigger.state = %state,
            "センチネルの監視を確立できません"
        );
    }

    /// 検索語を変更する
    ///
    /// - `ClientSide`: 表示を絞り込むだけで取得しない（`None` を返す）
    /// - `ServerQuery`: 取得済みリストを捨て、トークン 0 から取得し直す
    pub fn set_query(&self, query: &str) -> Result<Option<DispatchOutcome>, SessionError> {
        let filter = SearchFilter::new(query);
        let mut state = self.inner.lock();
        state.query = query.to_string();
        if state.filter == filter {
            return Ok(None);
        }
        state.filter = filter;

        match self.inner.config.filter_mode {
            FilterMode::ClientSide => Ok(None),
            FilterMode::ServerQuery => self
                .inner
                .reset(&mut state)
                .map(|started| Some(started.into_outcome())),
        }
    }

    /// 取得済みリストを捨て、トークン 0 から取得し直す
    pub fn refetch(&self) -> Result<DispatchOutcome, SessionError> {
        let mut state = self.inner.lock();
        self.inner.reset(&mut state).map(Started::into_outcome)
    }

    /// 変更操作を検証し、取得済みリストに反映する
    pub fn apply_mutation(
        &self,
        mutation: Mutation<T>,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome<T>, DomainError> {
        let mut state = self.inner.lock();
        let outcome = mutation.plan(&state.list, now)?;
        state.list.apply_mutation(outcome.clone());
        Ok(outcome)
    }

    /// 変更操作を検証だけする（リストは変更しない）
    pub fn plan_mutation(
        &self,
        mutation: Mutation<T>,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome<T>, DomainError> {
        mutation.plan(&self.inner.lock().list, now)
    }

    /// 描画用のスナップショットを取る
    pub fn snapshot(&self) -> ListSnapshot<T> {
        let state = self.inner.lock();
        let items = match self.inner.config.filter_mode {
            FilterMode::ClientSide => state.list.filtered(&state.filter).into_iter().cloned().collect(),
            FilterMode::ServerQuery => state.list.items().to_vec(),
        };
        let fetching = state.trigger.is_fetching();

        ListSnapshot {
            items,
            loaded_count: state.list.len(),
            pages_loaded: state.list.pages_loaded(),
            next_token: state.next_token,
            has_more: state.trigger.has_more(),
            is_loading: fetching && state.is_loading,
            is_fetching_next_page: fetching && !state.is_loading,
            trigger_state: state.trigger.state(),
            observer: state.trigger.observer(),
            query: state.query.clone(),
            last_error: state.last_error.clone(),
        }
    }

    /// アンマウントする
    ///
    /// 可視性監視を解除し、進行中の取得を中断する。2 回目以降は何もしない。
    pub fn unmount(&self) {
        let in_flight = {
            let mut state = self.inner.lock();
            if state.unmounted {
                return;
            }
            state.unmounted = true;
            state.is_loading = false;
            state.trigger.detach();
            state.in_flight.take()
        };
        if let Some(handle) = in_flight {
            handle.abort();
        }
        self.inner.settled.notify_waiters();

        log_business_event!(
            event.category = event::category::LIST,
            event.action = event::action::SESSION_UNMOUNTED,
            event.entity_type = T::KIND.resource(),
            event.result = event::result::SUCCESS,
            "リストセッションを終了"
        );
    }
}

impl<T: Record> Drop for ListSession<T> {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// センチネルのハンドル
///
/// 可視性監視のコールバックから呼ばれる。セッションを弱参照で持つため、
/// アンマウント後の呼び出しはすべて何もしない。
pub struct SentinelHandle<T: Record> {
    inner: Weak<SessionInner<T>>,
}

impl<T: Record> Clone for SentinelHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T: Record> SentinelHandle<T> {
    /// セッションが生きているか
    pub fn is_attached(&self) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let unmounted = inner.lock().unmounted;
        !unmounted
    }

    /// 可視性の変化を通知する（取得は発行しない）
    pub fn visibility_changed(&self, visible: bool) -> TriggerState {
        let Some(inner) = self.inner.upgrade() else {
            return TriggerState::Idle;
        };
        let state = inner.lock().trigger.set_visible(visible);
        state
    }

    /// センチネルが可視領域に入ったことを通知する
    ///
    /// 取得可能なら次のページの取得を 1 回発行する。
    pub fn intersect(&self) -> Result<DispatchOutcome, SessionError> {
        let Some(inner) = self.inner.upgrade() else {
            return Ok(DispatchOutcome::Skipped(SkipReason::Detached));
        };
        let mut state = inner.lock();
        let action = state.trigger.intersect();
        inner.dispatch(&mut state, action).map(Started::into_outcome)
    }
}
