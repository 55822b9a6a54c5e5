//! # メール
//!
//! メールキャンペーン一覧（無限スクロール画面）のレコード。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Record, RecordKind};
use crate::value_objects::{ContactEmail, EmailSubject, RecordId};

/// メール送信ステータス
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum EmailStatus {
    Sent,
    Draft,
    Scheduled,
}

/// メール
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id:        RecordId,
    pub subject:   EmailSubject,
    pub recipient: ContactEmail,
    pub status:    EmailStatus,
    pub sent_at:   DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template:  Option<String>,
}

impl Record for Email {
    const KIND: RecordKind = RecordKind::Email;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.subject.as_str(), self.recipient.as_str()]
    }

    fn display_label(&self) -> String {
        self.subject.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::filter::SearchFilter;

    fn email() -> Email {
        Email {
            id:        RecordId::new("0-0").unwrap(),
            subject:   EmailSubject::new("Email Subject 1").unwrap(),
            recipient: ContactEmail::new("recipient1@example.com").unwrap(),
            status:    EmailStatus::Scheduled,
            sent_at:   DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            template:  None,
        }
    }

    #[test]
    fn test_件名と宛先で検索できる() {
        let target = email();

        assert!(target.matches(&SearchFilter::new("subject 1")));
        assert!(target.matches(&SearchFilter::new("RECIPIENT1")));
        assert!(!target.matches(&SearchFilter::new("newsletter")));
    }

    #[test]
    fn test_テンプレートなしはjsonに含まれない() {
        let json = serde_json::to_value(email()).unwrap();

        assert_eq!(json["status"], "Scheduled");
        assert!(json.get("template").is_none());
    }

    #[test]
    fn test_jsonから復元できる() {
        let json = serde_json::json!({
            "id": "2-3",
            "subject": "Email Subject 24",
            "recipient": "recipient4@example.com",
            "status": "Sent",
            "sent_at": "2024-03-01T09:00:00Z",
            "template": "welcome"
        });

        let email: Email = serde_json::from_value(json).unwrap();

        assert_eq!(email.id.as_str(), "2-3");
        assert_eq!(email.template.as_deref(), Some("welcome"));
    }

    #[test]
    fn test_件名が空のjsonは拒否される() {
        let json = serde_json::json!({
            "id": "2-3",
            "subject": "  ",
            "recipient": "recipient4@example.com",
            "status": "Sent",
            "sent_at": "2024-03-01T09:00:00Z"
        });

        assert!(serde_json::from_value::<Email>(json).is_err());
    }
}
