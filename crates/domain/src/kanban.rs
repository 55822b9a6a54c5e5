//! # カンバン
//!
//! 取得済みレコードをステータス列ごとに振り分ける。
//!
//! 列はステータスの宣言順にすべて並び、該当レコードがない列も空のまま残す。
//! 列内の並びは取得順（[`AccumulatedList`](crate::accumulated_list::AccumulatedList) の順序）を保つ。

use std::collections::HashMap;
use std::hash::Hash;

use itertools::Itertools;

use crate::record::{Customer, CustomerStatus, Project, ProjectStatus};

/// カンバンの列になるステータス
pub trait KanbanColumn: Copy + Eq + Hash + 'static {
    /// 表示順に並んだすべての列
    fn columns() -> &'static [Self];

    /// 列見出し
    fn title(&self) -> &'static str;
}

/// ステータス列を持つレコード
pub trait KanbanCard {
    type Column: KanbanColumn;

    fn column(&self) -> Self::Column;
}

impl KanbanCard for Project {
    type Column = ProjectStatus;

    fn column(&self) -> ProjectStatus {
        self.status
    }
}

impl KanbanCard for Customer {
    type Column = CustomerStatus;

    fn column(&self) -> CustomerStatus {
        self.status
    }
}

/// カンバンの 1 列
#[derive(Debug, Clone, PartialEq)]
pub struct KanbanLane<'a, C, T> {
    pub column: C,
    pub title:  &'static str,
    pub cards:  Vec<&'a T>,
}

impl<C, T> KanbanLane<'_, C, T> {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// レコードを列ごとに振り分ける
pub fn group_into_lanes<'a, T>(records: &'a [T]) -> Vec<KanbanLane<'a, T::Column, T>>
where
    T: KanbanCard,
{
    let mut grouped: HashMap<T::Column, Vec<&'a T>> =
        records.iter().into_group_map_by(|record| record.column());

    T::Column::columns()
        .iter()
        .map(|&column| KanbanLane {
            column,
            title: column.title(),
            cards: grouped.remove(&column).unwrap_or_default(),
        })
        .collect()
}
