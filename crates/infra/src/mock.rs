//! # テスト用モック
//!
//! セッションのテストで使用する、スクリプト化されたデータソースと失敗する通知。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! crmdash-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc,
        Mutex,
        MutexGuard,
        PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use crmdash_domain::{
    notification::{Notification, NotificationError},
    pagination::{PageRequest, PageResult, PageToken},
    record::Record,
};
use tokio::sync::watch;

use crate::{data_source::DataSource, error::InfraError, notification::Notifier};

// ===== ScriptedDataSource =====

/// スクリプトの 1 応答
#[derive(Debug, Clone)]
enum Scripted<T> {
    Page(PageResult<T>),
    Failure(String),
}

/// トークンごとに応答を台本で決めるデータソース
///
/// - 同じトークンに複数の応答を積むと、呼び出しごとに先頭から消費する
/// - 最後の 1 件は消費されず、以降の呼び出しでも繰り返し返す
/// - [`hold`](Self::hold) 中の取得は [`release`](Self::release) まで応答しない
#[derive(Clone)]
pub struct ScriptedDataSource<T> {
    script:        Arc<Mutex<HashMap<PageToken, VecDeque<Scripted<T>>>>>,
    requests:      Arc<Mutex<Vec<PageRequest>>>,
    gate:          Arc<watch::Sender<bool>>,
    in_flight:     Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl<T: Record> Default for ScriptedDataSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> ScriptedDataSource<T> {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            script: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            gate: Arc::new(gate),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// トークン 0 から順に並んだページを台本にする
    ///
    /// 最後のページだけ `has_more = false` になる。
    pub fn with_pages(pages: Vec<Vec<T>>) -> Self {
        let source = Self::new();
        let count = pages.len() as u64;
        for (i, items) in (0_u64..).zip(pages) {
            source.push_page(
                PageToken::new(i),
                PageResult::new(items, PageToken::new(i + 1), i + 1 < count),
            );
        }
        source
    }

    pub fn push_page(&self, token: PageToken, page: PageResult<T>) {
        self.push(token, Scripted::Page(page));
    }

    pub fn push_failure(&self, token: PageToken, message: impl Into<String>) {
        self.push(token, Scripted::Failure(message.into()));
    }

    /// 指定トークンの台本を差し替える
    pub fn replace_page(&self, token: PageToken, page: PageResult<T>) {
        lock(&self.script).insert(token, VecDeque::from([Scripted::Page(page)]));
    }

    fn push(&self, token: PageToken, response: Scripted<T>) {
        lock(&self.script).entry(token).or_default().push_back(response);
    }

    /// 以降の取得を応答させずに保留する
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// 保留中の取得を応答させる
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// 受け付けたリクエスト（到着順）
    pub fn requests(&self) -> Vec<PageRequest> {
        lock(&self.requests).clone()
    }

    /// 受け付けたトークン（到着順）
    pub fn requested_tokens(&self) -> Vec<u64> {
        lock(&self.requests).iter().map(|r| r.token.as_u64()).collect()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// 同時に応答待ちだった取得の最大数
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_response(&self, token: PageToken) -> Option<Scripted<T>> {
        let mut script = lock(&self.script);
        let queue = script.get_mut(&token)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl<T: Record> DataSource<T> for ScriptedDataSource<T> {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult<T>, InfraError> {
        lock(&self.requests).push(request.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _in_flight = InFlightGuard(&self.in_flight);

        let mut gate = self.gate.subscribe();
        gate.wait_for(|open| *open)
            .await
            .map_err(|_| InfraError::unexpected("ゲートが閉じられました"))?;

        match self.next_response(request.token) {
            Some(Scripted::Page(page)) => Ok(page),
            Some(Scripted::Failure(message)) => Err(InfraError::unavailable(message)),
            None => Err(InfraError::unexpected(format!(
                "トークン {} の台本がありません",
                request.token
            ))),
        }
    }
}

/// 応答待ち数を減らす（取得がキャンセルされた場合も含む）
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ===== FailingNotifier =====

/// 常に送信に失敗する通知（呼び出し回数を記録する）
#[derive(Debug, Clone, Default)]
pub struct FailingNotifier {
    attempts: Arc<AtomicUsize>,
}

impl FailingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<(), NotificationError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(NotificationError::ChannelClosed)
    }
}
