//! # レコード
//!
//! リスト画面に並ぶ業務レコードの共通インターフェースを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 画面 |
//! |---|------------|------|
//! | [`Customer`] | 顧客 | 顧客一覧・顧客カンバン |
//! | [`Invoice`] | 請求書 | 請求書一覧 |
//! | [`Project`] | プロジェクト | プロジェクト一覧・カンバン |
//! | [`Email`] | メール | メールキャンペーン一覧（無限スクロール） |
//! | [`Survey`] | アンケート | アンケート一覧 |
//!
//! レコード間の参照関係は強制しない（プロジェクトの `client` は自由記述のラベル）。

mod customer;
mod email;
mod invoice;
mod project;
mod survey;

use chrono::{DateTime, Utc};
pub use customer::{Customer, CustomerSegment, CustomerStatus};
pub use email::{Email, EmailStatus};
pub use invoice::{Discount, Invoice, InvoiceStatus, InvoiceTotals, LineItem};
pub use project::{Priority, Project, ProjectStatus};
pub use survey::{Question, QuestionKind, Survey, SurveyStatus};

use crate::{filter::SearchFilter, value_objects::RecordId};

/// レコード種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum RecordKind {
    Customer,
    Invoice,
    Project,
    Email,
    Survey,
}

impl RecordKind {
    /// エラーメッセージ用のエンティティ名（`DomainError::NotFound` の `entity_type`）
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Invoice => "Invoice",
            Self::Project => "Project",
            Self::Email => "Email",
            Self::Survey => "Survey",
        }
    }

    /// データ API のリソースパス（`GET /{resource}?token=N`）
    pub fn resource(&self) -> &'static str {
        match self {
            Self::Customer => "customers",
            Self::Invoice => "invoices",
            Self::Project => "projects",
            Self::Email => "emails",
            Self::Survey => "surveys",
        }
    }

    /// リソースパスからレコード種別を引く
    pub fn from_resource(resource: &str) -> Option<Self> {
        use strum::IntoEnumIterator as _;

        Self::iter().find(|kind| kind.resource() == resource)
    }

    /// 通知に表示する名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Customer => "顧客",
            Self::Invoice => "請求書",
            Self::Project => "プロジェクト",
            Self::Email => "メール",
            Self::Survey => "アンケート",
        }
    }
}

/// 業務レコードの共通インターフェース
///
/// リストセッションはこのトレイトだけを通してレコードを扱う。
pub trait Record: Clone + Send + Sync + 'static {
    const KIND: RecordKind;

    /// 取得済みリスト内で一意な識別子
    fn id(&self) -> &RecordId;

    /// 部分一致検索の対象フィールド
    fn search_fields(&self) -> Vec<&str>;

    /// 通知に表示するレコード名（件名、請求書番号など）
    fn display_label(&self) -> String;

    /// 検索フィルタに一致するか（空のフィルタはすべてに一致する）
    fn matches(&self, filter: &SearchFilter) -> bool {
        filter.matches_any(&self.search_fields())
    }

    /// 作成時のタイムスタンプ付与（タイムスタンプを持つレコードのみ上書きする）
    fn stamp_created(&mut self, _now: DateTime<Utc>) {}

    /// 更新時のタイムスタンプ付与
    fn stamp_updated(&mut self, _now: DateTime<Utc>) {}
}
