//! # アンケート
//!
//! アンケートは作成・更新時刻を持つ唯一のレコード。
//! 変更操作の適用時に [`Record::stamp_created`] / [`Record::stamp_updated`] で時刻が付与される。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Record, RecordKind};
use crate::value_objects::{RecordId, SurveyTitle};

/// アンケートステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SurveyStatus {
    Draft,
    Active,
    Completed,
    Archived,
}

/// 設問の種類
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice { options: Vec<String> },
    Text,
    Rating,
}

/// 設問
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id:       String,
    #[serde(flatten)]
    pub kind:     QuestionKind,
    pub text:     String,
    pub required: bool,
}

/// アンケート
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    pub id:          RecordId,
    pub title:       SurveyTitle,
    pub description: String,
    pub status:      SurveyStatus,
    pub questions:   Vec<Question>,
    pub created_at:  DateTime<Utc>,
    pub updated_at:  DateTime<Utc>,
    pub responses:   u32,
}

impl Record for Survey {
    const KIND: RecordKind = RecordKind::Survey;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), &self.description]
    }

    fn display_label(&self) -> String {
        self.title.to_string()
    }

    /// 新規作成時は回答数を 0 に戻す
    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
        self.updated_at = now;
        self.responses = 0;
    }

    fn stamp_updated(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn survey() -> Survey {
        let epoch = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        Survey {
            id:          RecordId::new("s-1").unwrap(),
            title:       SurveyTitle::new("Customer Satisfaction").unwrap(),
            description: "Quarterly feedback".to_string(),
            status:      SurveyStatus::Active,
            questions:   vec![Question {
                id:       "q1".to_string(),
                kind:     QuestionKind::MultipleChoice {
                    options: vec!["Yes".to_string(), "No".to_string()],
                },
                text:     "Would you recommend us?".to_string(),
                required: true,
            }],
            created_at:  epoch,
            updated_at:  epoch,
            responses:   128,
        }
    }

    #[rstest]
    fn test_作成時に時刻と回答数がリセットされる(mut survey: Survey) {
        let now = DateTime::from_timestamp(1_800_000_000, 0).unwrap();

        survey.stamp_created(now);

        assert_eq!(survey.created_at, now);
        assert_eq!(survey.updated_at, now);
        assert_eq!(survey.responses, 0);
    }

    #[rstest]
    fn test_更新時は更新時刻のみ変わる(mut survey: Survey) {
        let created_at = survey.created_at;
        let now = DateTime::from_timestamp(1_800_000_000, 0).unwrap();

        survey.stamp_updated(now);

        assert_eq!(survey.created_at, created_at);
        assert_eq!(survey.updated_at, now);
        assert_eq!(survey.responses, 128);
    }

    #[rstest]
    fn test_設問の種類はtypeタグで表現される(survey: Survey) {
        let json = serde_json::to_value(&survey.questions[0]).unwrap();

        assert_eq!(json["type"], "multiple_choice");
        assert_eq!(json["options"], serde_json::json!(["Yes", "No"]));
        assert_eq!(json["text"], "Would you recommend us?");
    }

    #[rstest]
    fn test_説明文でも検索できる(survey: Survey) {
        use crate::filter::SearchFilter;

        assert!(survey.matches(&SearchFilter::new("quarterly")));
    }
}
