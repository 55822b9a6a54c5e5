//! # 顧客

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, RecordKind};
use crate::{
    kanban::KanbanColumn,
    value_objects::{ContactEmail, Money, PersonName, RecordId},
};

/// 顧客ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CustomerStatus {
    Active,
    Inactive,
}

impl KanbanColumn for CustomerStatus {
    fn columns() -> &'static [Self] {
        &[Self::Active, Self::Inactive]
    }

    fn title(&self) -> &'static str {
        match self {
            Self::Active => "アクティブ",
            Self::Inactive => "非アクティブ",
        }
    }
}

/// 顧客セグメント
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CustomerSegment {
    Premium,
    Regular,
}

/// 顧客
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id:            RecordId,
    pub name:          PersonName,
    pub email:         ContactEmail,
    pub status:        CustomerStatus,
    pub segment:       CustomerSegment,
    pub last_purchase: NaiveDate,
    pub total_spent:   Money,
}

impl Customer {
    /// 顧客名のイニシャル（アバター表示用）
    ///
    /// 単語ごとの先頭文字を最大 2 文字まで大文字で連結する。
    pub fn initials(&self) -> String {
        self.name
            .as_str()
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

impl Record for Customer {
    const KIND: RecordKind = RecordKind::Customer;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }

    fn display_label(&self) -> String {
        self.name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::filter::SearchFilter;

    fn customer(name: &str, email: &str) -> Customer {
        Customer {
            id:            RecordId::new("c-1").unwrap(),
            name:          PersonName::new(name).unwrap(),
            email:         ContactEmail::new(email).unwrap(),
            status:        CustomerStatus::Active,
            segment:       CustomerSegment::Premium,
            last_purchase: NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            total_spent:   Money::from_dollars(12_450),
        }
    }

    #[test]
    fn test_イニシャルは先頭2語の頭文字() {
        assert_eq!(customer("alex thompson", "a@x.io").initials(), "AT");
        assert_eq!(customer("Mary Ann Lee", "m@x.io").initials(), "MA");
        assert_eq!(customer("Cher", "c@x.io").initials(), "C");
    }

    #[test]
    fn test_名前とメールアドレスで検索できる() {
        let target = customer("Michael Chen", "m.chen@tech.co");

        assert!(target.matches(&SearchFilter::new("chen")));
        assert!(target.matches(&SearchFilter::new("tech.co")));
        assert!(!target.matches(&SearchFilter::new("startup")));
    }

    #[test]
    fn test_json形式はスネークケース() {
        let json = serde_json::to_value(customer("Emma Davis", "emma.d@design.co")).unwrap();

        assert_eq!(json["status"], "active");
        assert_eq!(json["last_purchase"], "2024-02-15");
        assert_eq!(json["total_spent"], 1_245_000);
    }
}
