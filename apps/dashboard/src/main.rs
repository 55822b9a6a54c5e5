//! # crmdash-viewer
//!
//! 設定されたリストを無限スクロールで末尾まで読み込み、結果を表示する CLI。
//!
//! ## 動作
//!
//! ```text
//! mount ─▶ token 0 ─▶ センチネル可視 ─▶ intersect ─▶ token 1 ─▶ … ─▶ has_more = false
//!                                          │
//!                                          └─ 失敗時は同じトークンを再試行（最大 3 回）
//! ```
//!
//! 第 1 引数を検索語として扱う（`FILTER_MODE` に従って適用される）。
//! `DELETE_ID` を設定すると、読み込み後にそのレコードを削除する
//! （`MUTATION_POLICY=refetch` ならトークン 0 から読み込み直す）。
//!
//! ## 起動方法
//!
//! ```bash
//! # シードデータのプロジェクト一覧（カンバン表示）
//! LIST_KIND=projects FETCH_DELAY_MS=100 cargo run -p crmdash-dashboard
//!
//! # HTTP データ API のメール一覧を検索
//! DATA_SOURCE=http DATA_SOURCE_URL=http://localhost:8080/api \
//!   FILTER_MODE=server_query cargo run -p crmdash-dashboard -- "subject 1"
//! ```

use std::sync::Arc;

use anyhow::Context as _;
use crmdash_dashboard::{
    config::{DashboardConfig, DataSourceConfig},
    usecase::{DispatchOutcome, ListSession, ListSnapshot, MutationPolicy},
};
use crmdash_domain::{
    clock::SystemClock,
    kanban::{KanbanCard, group_into_lanes},
    mutation::Mutation,
    record::{Customer, Email, Invoice, Project, Record, RecordKind, Survey},
    scroll_trigger::SkipReason,
    value_objects::RecordId,
};
use crmdash_infra::{DataSource, HttpDataSource, LogNotifier, SeedRecord, SeededDataSource};
use crmdash_shared::observability::{TracingConfig, init_tracing};
use serde::de::DeserializeOwned;

/// 同じトークンを再試行する上限
const MAX_RETRIES: u32 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let _span = init_tracing(TracingConfig::from_env("crmdash-viewer"));

    let config = DashboardConfig::from_env().context("設定の読み込みに失敗しました")?;
    let query = std::env::args().nth(1);
    tracing::info!(
        list.kind = config.list_kind.resource(),
        list.filter_mode = %config.filter_mode,
        "リストビューアを起動"
    );

    match config.list_kind {
        RecordKind::Customer => {
            let items = view::<Customer>(&config, query.as_deref()).await?;
            print_lanes(&items);
        }
        RecordKind::Project => {
            let items = view::<Project>(&config, query.as_deref()).await?;
            print_lanes(&items);
        }
        RecordKind::Invoice => print_rows(&view::<Invoice>(&config, query.as_deref()).await?),
        RecordKind::Email => print_rows(&view::<Email>(&config, query.as_deref()).await?),
        RecordKind::Survey => print_rows(&view::<Survey>(&config, query.as_deref()).await?),
    }

    Ok(())
}

fn build_source<T>(config: &DashboardConfig) -> anyhow::Result<Arc<dyn DataSource<T>>>
where
    T: SeedRecord + DeserializeOwned,
{
    let source: Arc<dyn DataSource<T>> = match &config.data_source {
        DataSourceConfig::Seeded {
            seed,
            page_size,
            page_limit,
            delay,
        } => Arc::new(
            SeededDataSource::new(*seed)
                .with_page_size(*page_size)
                .with_page_limit(*page_limit)
                .with_delay(*delay)
                .with_clock(&SystemClock),
        ),
        DataSourceConfig::Http { base_url } => Arc::new(
            HttpDataSource::new(base_url).context("データ API の URL が不正です")?,
        ),
    };
    Ok(source)
}

/// リストを読み込み、必要なら変更操作を反映して表示対象のレコードを返す
async fn view<T>(config: &DashboardConfig, query: Option<&str>) -> anyhow::Result<Vec<T>>
where
    T: SeedRecord + DeserializeOwned,
{
    let session = ListSession::mount(build_source::<T>(config)?, config.session_config());
    if let Some(query) = query {
        session.set_query(query)?;
    }
    session.wait_until_settled().await;
    let mut snapshot = scroll_to_end(&session).await?;

    if let Some(id) = &config.delete_id {
        let service = config.mutation_service(Arc::new(LogNotifier), Arc::new(SystemClock));
        let outcome = service
            .execute(&session, Mutation::Delete(RecordId::new(id.as_str())?))
            .await;
        if let Err(e) = outcome {
            tracing::warn!(error = %e, record.id = %id, "削除できませんでした");
        }
        snapshot = match service.policy() {
            MutationPolicy::LocalApply => session.snapshot(),
            MutationPolicy::Refetch => {
                session.wait_until_settled().await;
                scroll_to_end(&session).await?
            }
        };
    }

    Ok(snapshot.items)
}

/// センチネルを可視にして終端まで読み込む
async fn scroll_to_end<T: Record>(session: &ListSession<T>) -> anyhow::Result<ListSnapshot<T>> {
    let sentinel = session.sentinel();
    sentinel.visibility_changed(true);

    let mut retries = 0;
    loop {
        let snapshot = session.snapshot();
        if let Some(failure) = &snapshot.last_error {
            if !failure.retryable || retries >= MAX_RETRIES {
                anyhow::bail!("ページ取得に失敗しました: {}", failure.message);
            }
            retries += 1;
            tracing::warn!(retry = retries, error = %failure.message, "再試行");
            session.fetch_next_page()?;
            session.wait_until_settled().await;
            continue;
        }
        if snapshot.is_end_of_list() {
            report_end(&snapshot);
            return Ok(snapshot);
        }

        match sentinel.intersect()? {
            DispatchOutcome::Dispatched(token) => {
                tracing::debug!(list.token = %token, "次のページを要求");
                retries = 0;
            }
            DispatchOutcome::Skipped(SkipReason::InFlight) => {}
            DispatchOutcome::Skipped(reason) => {
                tracing::info!(%reason, "これ以上取得しません");
                return Ok(snapshot);
            }
        }
        session.wait_until_settled().await;
    }
}

fn report_end<T: Record>(snapshot: &ListSnapshot<T>) {
    tracing::info!(
        list.kind = T::KIND.resource(),
        list.pages = snapshot.pages_loaded,
        list.loaded = snapshot.loaded_count,
        list.shown = snapshot.items.len(),
        "これ以上ありません"
    );
}

fn print_rows<T: Record>(items: &[T]) {
    println!("{}（{} 件）", T::KIND.display_name(), items.len());
    for item in items {
        println!("  {:<8} {}", item.id().as_str(), item.display_label());
    }
}

fn print_lanes<T>(items: &[T])
where
    T: Record + KanbanCard,
{
    println!("{}（{} 件）", T::KIND.display_name(), items.len());
    for lane in group_into_lanes(items) {
        println!("■ {}（{}）", lane.title, lane.len());
        for card in &lane.cards {
            println!("  {:<8} {}", card.id().as_str(), card.display_label());
        }
    }
}
