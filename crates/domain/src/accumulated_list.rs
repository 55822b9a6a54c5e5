//! # 取得済みリスト
//!
//! 無限スクロールで取得したページを取得順に連結したリスト。
//!
//! - ページは取得に成功した順に末尾へ追加される（トークン昇順）
//! - ページ間の重複 ID は排除しない
//! - 変更操作（作成・更新・削除）はサーバーへの往復なしにここへ直接反映される

use crate::{
    filter::SearchFilter,
    mutation::MutationOutcome,
    record::Record,
    value_objects::RecordId,
};

/// 取得済みレコードの連結リスト
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatedList<T> {
    items:        Vec<T>,
    pages_loaded: usize,
}

impl<T> Default for AccumulatedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AccumulatedList<T> {
    pub fn new() -> Self {
        Self {
            items:        Vec::new(),
            pages_loaded: 0,
        }
    }

    /// 1 ページ分のレコードを末尾に追加する（空ページも 1 ページと数える）
    pub fn append_page(&mut self, items: Vec<T>) {
        self.items.extend(items);
        self.pages_loaded += 1;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// 追加済みページ数
    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    /// セッションのリセット時に呼ぶ
    pub fn clear(&mut self) {
        self.items.clear();
        self.pages_loaded = 0;
    }
}

impl<T: Record> AccumulatedList<T> {
    pub fn find(&self, id: &RecordId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.find(id).is_some()
    }

    /// 検索フィルタに一致するレコード（取得順）
    ///
    /// 追加取得は行わない。結果が空でも続きのページがないことを意味しない。
    pub fn filtered(&self, filter: &SearchFilter) -> Vec<&T> {
        self.items.iter().filter(|item| item.matches(filter)).collect()
    }

    /// 検証済みの変更結果を反映する
    ///
    /// 更新・削除は同じ ID を持つすべてのレコードに作用する。
    pub fn apply_mutation(&mut self, outcome: MutationOutcome<T>) {
        match outcome {
            MutationOutcome::Created(record) => self.items.push(record),
            MutationOutcome::Updated(record) => {
                for item in self.items.iter_mut().filter(|item| item.id() == record.id()) {
                    *item = record.clone();
                }
            }
            MutationOutcome::Deleted(record) => {
                self.items.retain(|item| item.id() != record.id());
            }
        }
    }
}
