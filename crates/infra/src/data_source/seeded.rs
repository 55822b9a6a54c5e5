//! シードデータソース
//!
//! 乱数シードとページトークンから決定的にレコードを生成する。
//! 同じシード・同じトークンの取得は常に同じページを返すため、再試行しても結果が変わらない。
//!
//! ## 既定値
//!
//! | 項目 | 既定値 |
//! |------|--------|
//! | ページサイズ | 10 |
//! | ページ数 | 6（トークン 5 が最終ページ） |
//! | 遅延 | 1 秒 |

use std::{
    collections::HashMap,
    marker::PhantomData,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Days, Duration as ChronoDuration, Utc};
use crmdash_domain::{
    DomainError,
    clock::{Clock, SystemClock},
    filter::SearchFilter,
    pagination::{PageRequest, PageResult, PageToken},
    record::{
        Customer,
        CustomerSegment,
        CustomerStatus,
        Email,
        EmailStatus,
        Invoice,
        InvoiceStatus,
        Priority,
        Project,
        ProjectStatus,
        Question,
        QuestionKind,
        Record,
        Survey,
        SurveyStatus,
    },
    value_objects::{
        ClientLabel,
        ContactEmail,
        EmailSubject,
        InvoiceNumber,
        Money,
        PersonName,
        ProjectName,
        RecordId,
        SurveyTitle,
    },
};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::DataSource;
use crate::error::InfraError;

/// 既定のページサイズ
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// 既定のページ数
pub const DEFAULT_PAGE_LIMIT: u64 = 6;
/// 既定の遅延
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// シード生成 1 件分の入力
pub struct SeedContext<'a> {
    /// ページトークン
    pub page:   u64,
    /// ページ内の位置（0 始まり）
    pub index:  usize,
    /// 全ページ通しての位置（0 始まり）
    pub global: u64,
    /// 生成時刻の基準
    pub anchor: DateTime<Utc>,
    pub rng:    &'a mut StdRng,
}

impl SeedContext<'_> {
    /// 通しの位置から ID を作る（`"{page}-{index}"`）
    pub fn record_id(&self) -> Result<RecordId, DomainError> {
        RecordId::new(format!("{}-{}", self.page, self.index))
    }

    fn pick<'p, P>(&mut self, pool: &'p [P]) -> &'p P {
        &pool[self.rng.random_range(0..pool.len())]
    }
}

/// シード生成に対応したレコード
pub trait SeedRecord: Record {
    fn generate(ctx: &mut SeedContext<'_>) -> Result<Self, DomainError>;
}

/// シードデータソース
pub struct SeededDataSource<T> {
    seed:       u64,
    page_size:  usize,
    page_limit: u64,
    delay:      Duration,
    anchor:     DateTime<Utc>,
    /// トークンごとの残り失敗回数（`None` は常に失敗）
    failures:   Mutex<HashMap<PageToken, Option<u32>>>,
    _record:    PhantomData<fn() -> T>,
}

impl<T: SeedRecord> SeededDataSource<T> {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            page_size: DEFAULT_PAGE_SIZE,
            page_limit: DEFAULT_PAGE_LIMIT,
            delay: DEFAULT_DELAY,
            anchor: SystemClock.now(),
            failures: Mutex::new(HashMap::new()),
            _record: PhantomData,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// 取得できるページ数（`page_limit - 1` のトークンが最終ページ）
    pub fn with_page_limit(mut self, page_limit: u64) -> Self {
        self.page_limit = page_limit;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// 生成時刻の基準を時計から取る
    pub fn with_clock(mut self, clock: &dyn Clock) -> Self {
        self.anchor = clock.now();
        self
    }

    /// 指定トークンの取得を常に失敗させる
    pub fn with_failure(self, token: PageToken) -> Self {
        self.lock_failures().insert(token, None);
        self
    }

    /// 指定トークンの取得を `times` 回だけ失敗させる
    pub fn with_transient_failure(self, token: PageToken, times: u32) -> Self {
        self.lock_failures().insert(token, Some(times));
        self
    }

    fn lock_failures(&self) -> std::sync::MutexGuard<'_, HashMap<PageToken, Option<u32>>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 注入された失敗を消費する（失敗させる場合 `true`）
    fn take_failure(&self, token: PageToken) -> bool {
        let mut failures = self.lock_failures();
        match failures.get_mut(&token) {
            Some(None) => true,
            Some(Some(0)) | None => false,
            Some(Some(remaining)) => {
                *remaining -= 1;
                true
            }
        }
    }

    fn rng_for(&self, token: PageToken) -> StdRng {
        StdRng::seed_from_u64(
            self.seed
                .wrapping_add(token.as_u64().wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        )
    }

    /// 1 ページ分を生成する（遅延と失敗注入なし）
    pub fn generate_page(&self, request: &PageRequest) -> Result<PageResult<T>, InfraError> {
        let token = request.token;
        let page = token.as_u64();

        if page >= self.page_limit {
            return Ok(PageResult::new(Vec::new(), token.next(), false));
        }

        let mut rng = self.rng_for(token);
        let filter = SearchFilter::new(request.query.as_deref().unwrap_or_default());
        let mut items = Vec::with_capacity(self.page_size);

        for index in 0..self.page_size {
            let mut ctx = SeedContext {
                page,
                index,
                global: page * self.page_size as u64 + index as u64,
                anchor: self.anchor,
                rng: &mut rng,
            };
            let record = T::generate(&mut ctx)
                .map_err(|e| InfraError::unexpected(format!("シードデータの生成に失敗: {e}")))?;
            if record.matches(&filter) {
                items.push(record);
            }
        }

        Ok(PageResult::new(items, token.next(), page + 1 < self.page_limit))
    }
}

#[async_trait]
impl<T: SeedRecord> DataSource<T> for SeededDataSource<T> {
    #[tracing::instrument(skip_all, fields(kind = %T::KIND.resource(), token = %request.token))]
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult<T>, InfraError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.take_failure(request.token) {
            tracing::debug!("シードデータソース: 注入された失敗を返す");
            return Err(InfraError::unavailable(format!(
                "トークン {} の取得に失敗しました",
                request.token
            )));
        }

        self.generate_page(request)
    }
}

// ===== レコード生成 =====

const PEOPLE: &[&str] = &[
    "Alex Thompson",
    "Sarah Wilson",
    "Michael Chen",
    "Emma Davis",
    "James Miller",
    "Olivia Garcia",
];

const COMPANIES: &[&str] = &[
    "Acme Corp",
    "TechStart Inc",
    "Global Solutions",
    "Digital Dynamics",
    "TechCorp",
];

const PROJECTS: &[&str] = &[
    "Website Redesign",
    "Mobile App",
    "CRM Integration",
    "Data Migration",
    "Marketing Campaign",
];

const SURVEYS: &[&str] = &[
    "Customer Satisfaction Survey",
    "Product Feedback",
    "Onboarding Experience",
    "Support Quality",
];

fn days_before(anchor: DateTime<Utc>, days: u64) -> chrono::NaiveDate {
    let today = anchor.date_naive();
    today.checked_sub_days(Days::new(days)).unwrap_or(today)
}

impl SeedRecord for Email {
    fn generate(ctx: &mut SeedContext<'_>) -> Result<Self, DomainError> {
        let status = *ctx.pick(&[EmailStatus::Sent, EmailStatus::Draft, EmailStatus::Scheduled]);
        let age_ms = ctx.rng.random_range(0..10_000_000_000_i64);
        let template = if ctx.rng.random_bool(0.5) {
            "Template A"
        } else {
            "Template B"
        };

        Ok(Self {
            id: ctx.record_id()?,
            subject: EmailSubject::new(format!("Email Subject {}", ctx.page * 10 + ctx.index as u64 + 1))?,
            recipient: ContactEmail::new(format!("recipient{}@example.com", ctx.index + 1))?,
            status,
            sent_at: ctx.anchor - ChronoDuration::milliseconds(age_ms),
            template: Some(template.to_string()),
        })
    }
}

impl SeedRecord for Customer {
    fn generate(ctx: &mut SeedContext<'_>) -> Result<Self, DomainError> {
        let name = *ctx.pick(PEOPLE);
        let local = name.to_lowercase().replace(' ', ".");
        let status = *ctx.pick(&[CustomerStatus::Active, CustomerStatus::Inactive]);
        let segment = *ctx.pick(&[CustomerSegment::Premium, CustomerSegment::Regular]);
        let last_purchase = days_before(ctx.anchor, ctx.rng.random_range(0..365));
        let total_spent = Money::from_cents(ctx.rng.random_range(10_000..5_000_000));

        Ok(Self {
            id: ctx.record_id()?,
            name: PersonName::new(name)?,
            email: ContactEmail::new(format!("{local}{}@example.com", ctx.global + 1))?,
            status,
            segment,
            last_purchase,
            total_spent,
        })
    }
}

impl SeedRecord for Invoice {
    fn generate(ctx: &mut SeedContext<'_>) -> Result<Self, DomainError> {
        let customer = *ctx.pick(COMPANIES);
        let status = *ctx.pick(&[InvoiceStatus::Draft, InvoiceStatus::Sent, InvoiceStatus::Paid]);
        let amount = Money::from_cents(ctx.rng.random_range(10_000..1_000_000));
        let date = days_before(ctx.anchor, ctx.rng.random_range(0..90));

        Ok(Self {
            id: ctx.record_id()?,
            number: InvoiceNumber::new(format!("INV-{:03}", ctx.global + 1))?,
            customer: ClientLabel::new(customer)?,
            amount,
            status,
            date,
        })
    }
}

impl SeedRecord for Project {
    fn generate(ctx: &mut SeedContext<'_>) -> Result<Self, DomainError> {
        let name = *ctx.pick(PROJECTS);
        let client = *ctx.pick(COMPANIES);
        let status = *ctx.pick(&[
            ProjectStatus::Planned,
            ProjectStatus::InProgress,
            ProjectStatus::Completed,
            ProjectStatus::Delayed,
        ]);
        let priority = *ctx.pick(&[Priority::Low, Priority::Medium, Priority::High]);
        let today = ctx.anchor.date_naive();
        let deadline = today
            .checked_add_days(Days::new(ctx.rng.random_range(0..120)))
            .unwrap_or(today);

        Ok(Self {
            id: ctx.record_id()?,
            name: ProjectName::new(format!("{name} #{}", ctx.global + 1))?,
            client: ClientLabel::new(client)?,
            status,
            priority,
            deadline,
        })
    }
}

impl SeedRecord for Survey {
    fn generate(ctx: &mut SeedContext<'_>) -> Result<Self, DomainError> {
        let title = *ctx.pick(SURVEYS);
        let status = *ctx.pick(&[
            SurveyStatus::Draft,
            SurveyStatus::Active,
            SurveyStatus::Completed,
            SurveyStatus::Archived,
        ]);
        let created_at = ctx.anchor - ChronoDuration::days(ctx.rng.random_range(30..365));
        let updated_at = created_at + ChronoDuration::days(ctx.rng.random_range(0..30));

        Ok(Self {
            id: ctx.record_id()?,
            title: SurveyTitle::new(format!("{title} {}", ctx.global + 1))?,
            description: "Help us improve our services".to_string(),
            status,
            questions: vec![
                Question {
                    id:       "q1".to_string(),
                    kind:     QuestionKind::Rating,
                    text:     "How satisfied are you with our service?".to_string(),
                    required: true,
                },
                Question {
                    id:       "q2".to_string(),
                    kind:     QuestionKind::Text,
                    text:     "What could we improve?".to_string(),
                    required: false,
                },
            ],
            created_at,
            updated_at,
            responses: ctx.rng.random_range(0..200),
        })
    }
}
