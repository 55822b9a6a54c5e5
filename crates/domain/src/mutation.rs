//! # 変更操作
//!
//! 作成・更新・削除をコマンド（[`Mutation`]）と結果（[`MutationOutcome`]）に分け、
//! 取得済みリストへの反映を純粋なリデューサー
//! （[`AccumulatedList::apply_mutation`]）で行う。
//!
//! ## 設計方針
//!
//! - **検証と反映の分離**: [`Mutation::plan`] はリストを変更せずに検証だけ行う。
//!   呼び出し側は結果を見てから反映・通知・再取得のいずれかを選べる
//! - **ページネーションとは照合しない**: 作成したレコードが後続ページに
//!   同じ ID で現れても重複排除しない
//!
//! ```text
//! Mutation ──plan()──▶ Result<MutationOutcome, DomainError> ──apply_mutation()──▶ AccumulatedList
//! ```

use chrono::{DateTime, Utc};

use crate::{
    DomainError,
    accumulated_list::AccumulatedList,
    record::Record,
    value_objects::RecordId,
};

/// 変更コマンド
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<T> {
    /// リスト末尾に追加する
    Create(T),
    /// 同じ ID のレコードを置き換える
    Update(T),
    /// 指定 ID のレコードを取り除く
    Delete(RecordId),
}

/// 変更操作の種類（ログ・通知用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl<T: Record> Mutation<T> {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Create(_) => MutationKind::Create,
            Self::Update(_) => MutationKind::Update,
            Self::Delete(_) => MutationKind::Delete,
        }
    }

    /// 対象レコードの ID
    pub fn target_id(&self) -> &RecordId {
        match self {
            Self::Create(record) | Self::Update(record) => record.id(),
            Self::Delete(id) => id,
        }
    }

    /// 取得済みリストに対してコマンドを検証し、反映内容を確定する
    ///
    /// タイムスタンプを持つレコードにはここで `now` が付与される。
    ///
    /// # Errors
    ///
    /// - 作成: 同じ ID が既に存在する場合 `DomainError::Conflict`
    /// - 更新・削除: ID が存在しない場合 `DomainError::NotFound`
    pub fn plan(
        self,
        list: &AccumulatedList<T>,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome<T>, DomainError> {
        match self {
            Self::Create(mut record) => {
                if list.contains(record.id()) {
                    return Err(DomainError::Conflict(format!(
                        "{} {} は既に存在します",
                        T::KIND.display_name(),
                        record.id().as_str()
                    )));
                }
                record.stamp_created(now);
                Ok(MutationOutcome::Created(record))
            }
            Self::Update(mut record) => {
                if !list.contains(record.id()) {
                    return Err(not_found::<T>(record.id()));
                }
                record.stamp_updated(now);
                Ok(MutationOutcome::Updated(record))
            }
            Self::Delete(id) => list
                .find(&id)
                .cloned()
                .map(MutationOutcome::Deleted)
                .ok_or_else(|| not_found::<T>(&id)),
        }
    }
}

fn not_found<T: Record>(id: &RecordId) -> DomainError {
    DomainError::NotFound {
        entity_type: T::KIND.entity_type(),
        id:          id.as_str().to_string(),
    }
}

/// 検証済みの変更結果
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<T> {
    Created(T),
    Updated(T),
    /// 削除されたレコード（通知の表示名に使う）
    Deleted(T),
}

impl<T: Record> MutationOutcome<T> {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Created(_) => MutationKind::Create,
            Self::Updated(_) => MutationKind::Update,
            Self::Deleted(_) => MutationKind::Delete,
        }
    }

    pub fn record(&self) -> &T {
        match self {
            Self::Created(record) | Self::Updated(record) | Self::Deleted(record) => record,
        }
    }
}
