//! # プロジェクト

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, RecordKind};
use crate::{
    kanban::KanbanColumn,
    value_objects::{ClientLabel, ProjectName, RecordId},
};

/// プロジェクトステータス
///
/// カンバンの列順はこの宣言順に従う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ProjectStatus {
    Planned,
    InProgress,
    Completed,
    Delayed,
}

impl KanbanColumn for ProjectStatus {
    fn columns() -> &'static [Self] {
        &[
            Self::Planned,
            Self::InProgress,
            Self::Completed,
            Self::Delayed,
        ]
    }

    fn title(&self) -> &'static str {
        match self {
            Self::Planned => "計画中",
            Self::InProgress => "進行中",
            Self::Completed => "完了",
            Self::Delayed => "遅延",
        }
    }
}

/// 優先度
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// プロジェクト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id:       RecordId,
    pub name:     ProjectName,
    pub client:   ClientLabel,
    pub status:   ProjectStatus,
    pub priority: Priority,
    pub deadline: NaiveDate,
}

impl Project {
    /// 期限切れか（完了済みは対象外）
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != ProjectStatus::Completed && self.deadline < today
    }
}

impl Record for Project {
    const KIND: RecordKind = RecordKind::Project;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.client.as_str()]
    }

    fn display_label(&self) -> String {
        self.name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn project(status: ProjectStatus, deadline: NaiveDate) -> Project {
        Project {
            id: RecordId::new("p-1").unwrap(),
            name: ProjectName::new("Website Redesign").unwrap(),
            client: ClientLabel::new("TechCorp").unwrap(),
            status,
            priority: Priority::High,
            deadline,
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[rstest]
    #[case(ProjectStatus::InProgress, date(10), true)]
    #[case(ProjectStatus::InProgress, date(20), false)]
    #[case(ProjectStatus::Completed, date(10), false)]
    fn test_期限切れ判定(
        #[case] status: ProjectStatus,
        #[case] deadline: NaiveDate,
        #[case] expected: bool,
    ) {
        assert_eq!(project(status, deadline).is_overdue(date(15)), expected);
    }

    #[test]
    fn test_ステータスはケバブケースでシリアライズされる() {
        let json = serde_json::to_value(project(ProjectStatus::InProgress, date(1))).unwrap();
        assert_eq!(json["status"], "in-progress");
        assert_eq!(ProjectStatus::InProgress.to_string(), "in-progress");
    }

    #[test]
    fn test_優先度は高いほど大きい() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }
}
