//! # 変更操作ユースケース
//!
//! 作成・更新・削除をリストセッションに反映し、結果をトースト通知する。
//!
//! ## 設計方針
//!
//! - **反映方法の切り替え**: [`MutationPolicy`] で「取得済みリストへ直接反映」と
//!   「検証後にトークン 0 から再取得」を選ぶ
//! - **fire-and-forget**: 通知の送信失敗はログに残すだけで、変更操作の結果は変えない
//! - **進行中の取得とは照合しない**: 反映は取得済みリストに対してのみ行う

use std::sync::Arc;

use crmdash_domain::{
    clock::Clock,
    mutation::{Mutation, MutationKind, MutationOutcome},
    notification::Notification,
    record::Record,
};
use crmdash_infra::Notifier;
use crmdash_shared::{event_log::event, log_business_event};

use super::ListSession;
use crate::error::SessionError;

/// 変更操作の反映方法
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum MutationPolicy {
    /// 取得済みリストに直接反映する
    #[default]
    LocalApply,
    /// 検証だけ行い、トークン 0 から取得し直す
    Refetch,
}

/// 変更操作サービス
pub struct MutationService {
    notifier: Arc<dyn Notifier>,
    clock:    Arc<dyn Clock>,
    policy:   MutationPolicy,
}

impl MutationService {
    pub fn new(notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>, policy: MutationPolicy) -> Self {
        Self {
            notifier,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> MutationPolicy {
        self.policy
    }

    /// 変更操作を実行する
    ///
    /// 成功・失敗どちらの場合も通知を 1 件送る。
    ///
    /// # Errors
    ///
    /// - 検証に失敗した場合 `SessionError::Domain`（リストは変わらない）
    /// - `Refetch` で再取得を開始できなかった場合 `SessionError::Spawn`
    pub async fn execute<T: Record>(
        &self,
        session: &ListSession<T>,
        mutation: Mutation<T>,
    ) -> Result<MutationOutcome<T>, SessionError> {
        let kind = mutation.kind();
        let target_id = mutation.target_id().as_str().to_string();
        let now = self.clock.now();

        let planned = match self.policy {
            MutationPolicy::LocalApply => session.apply_mutation(mutation, now),
            MutationPolicy::Refetch => session.plan_mutation(mutation, now),
        };

        let outcome = match planned {
            Ok(outcome) => outcome,
            Err(e) => {
                log_business_event!(
                    event.category = event::category::RECORD,
                    event.action = event::action::RECORD_REJECTED,
                    event.entity_type = T::KIND.resource(),
                    event.entity_id = %target_id,
                    event.result = event::result::FAILURE,
                    mutation.kind = %kind,
                    error = %e,
                    "変更操作を却下"
                );
                self.notify(&Notification::from_rejection::<T>(kind, &e))
                    .await;
                return Err(e.into());
            }
        };

        log_business_event!(
            event.category = event::category::RECORD,
            event.action = record_action(outcome.kind()),
            event.entity_type = T::KIND.resource(),
            event.entity_id = %target_id,
            event.result = event::result::SUCCESS,
            mutation.policy = %self.policy,
            "変更操作を反映"
        );

        if self.policy == MutationPolicy::Refetch {
            session.refetch()?;
        }

        self.notify(&Notification::from_outcome(&outcome)).await;
        Ok(outcome)
    }

    /// 通知を送る（fire-and-forget）
    async fn notify(&self, notification: &Notification) {
        match self.notifier.notify(notification).await {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.result = event::result::SUCCESS,
                    notification.level = %notification.level,
                    notification.title = %notification.title,
                    "通知を送信"
                );
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.result = event::result::FAILURE,
                    notification.title = %notification.title,
                    error = %e,
                    "通知の送信に失敗"
                );
            }
        }
    }
}

fn record_action(kind: MutationKind) -> &'static str {
    match kind {
        MutationKind::Create => event::action::RECORD_CREATED,
        MutationKind::Update => event::action::RECORD_UPDATED,
        MutationKind::Delete => event::action::RECORD_DELETED,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::DateTime;
    use crmdash_domain::{
        DomainError,
        clock::FixedClock,
        notification::NotificationLevel,
        record::{Email, EmailStatus},
        value_objects::{ContactEmail, EmailSubject, RecordId},
    };
    use crmdash_infra::{
        ChannelNotifier,
        mock::{FailingNotifier, ScriptedDataSource},
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::usecase::SessionConfig;

    fn email(id: &str) -> Email {
        Email {
            id:        RecordId::new(id).unwrap(),
            subject:   EmailSubject::new(format!("Subject {id}")).unwrap(),
            recipient: ContactEmail::new("r@example.com").unwrap(),
            status:    EmailStatus::Draft,
            sent_at:   DateTime::from_timestamp(0, 0).unwrap(),
            template:  None,
        }
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ))
    }

    async fn mounted(source: ScriptedDataSource<Email>) -> ListSession<Email> {
        let session = ListSession::mount(Arc::new(source), SessionConfig::default());
        session.wait_until_settled().await;
        session
    }

    fn ids(session: &ListSession<Email>) -> Vec<String> {
        session
            .snapshot()
            .items
            .iter()
            .map(|e| e.id.as_str().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_作成はリスト末尾に追加され成功通知が届く() {
        let session = mounted(ScriptedDataSource::with_pages(vec![vec![email("0-0")]])).await;
        let (notifier, mut rx) = ChannelNotifier::channel();
        let service = MutationService::new(Arc::new(notifier), clock(), MutationPolicy::LocalApply);

        let outcome = service
            .execute(&session, Mutation::Create(email("new")))
            .await
            .unwrap();

        assert_eq!(outcome.kind(), MutationKind::Create);
        assert_eq!(ids(&session), vec!["0-0", "new"]);
        assert_eq!(rx.recv().await.unwrap().level, NotificationLevel::Success);
    }

    #[tokio::test]
    async fn test_存在しないidの削除は却下されエラー通知が届く() {
        let session = mounted(ScriptedDataSource::with_pages(vec![vec![email("0-0")]])).await;
        let (notifier, mut rx) = ChannelNotifier::channel();
        let service = MutationService::new(Arc::new(notifier), clock(), MutationPolicy::LocalApply);

        let result = service
            .execute(&session, Mutation::Delete(RecordId::new("missing").unwrap()))
            .await;

        assert!(matches!(
            result,
            Err(SessionError::Domain(DomainError::NotFound { .. }))
        ));
        assert_eq!(ids(&session), vec!["0-0"]);
        assert_eq!(rx.recv().await.unwrap().level, NotificationLevel::Error);
    }

    #[tokio::test]
    async fn test_通知に失敗しても変更は反映される() {
        let session = mounted(ScriptedDataSource::with_pages(vec![vec![email("0-0")]])).await;
        let notifier = FailingNotifier::new();
        let service =
            MutationService::new(Arc::new(notifier.clone()), clock(), MutationPolicy::LocalApply);

        let result = service
            .execute(&session, Mutation::Delete(RecordId::new("0-0").unwrap()))
            .await;

        assert!(result.is_ok());
        assert!(ids(&session).is_empty());
        assert_eq!(notifier.attempts(), 1);
    }

    #[tokio::test]
    async fn test_再取得ポリシーではトークン0から取得し直す() {
        let source = ScriptedDataSource::with_pages(vec![vec![email("0-0")]]);
        let handle = source.clone();
        let session = mounted(source).await;
        let (notifier, _rx) = ChannelNotifier::channel();
        let service = MutationService::new(Arc::new(notifier), clock(), MutationPolicy::Refetch);

        service
            .execute(&session, Mutation::Update(email("0-0")))
            .await
            .unwrap();
        session.wait_until_settled().await;

        assert_eq!(handle.requested_tokens(), vec![0, 0]);
        assert_eq!(ids(&session), vec!["0-0"]);
    }

    #[tokio::test]
    async fn test_再取得ポリシーでも検証に失敗したら取得しない() {
        let source = ScriptedDataSource::with_pages(vec![vec![email("0-0")]]);
        let handle = source.clone();
        let session = mounted(source).await;
        let (notifier, _rx) = ChannelNotifier::channel();
        let service = MutationService::new(Arc::new(notifier), clock(), MutationPolicy::Refetch);

        let result = service
            .execute(&session, Mutation::Create(email("0-0")))
            .await;

        assert!(matches!(
            result,
            Err(SessionError::Domain(DomainError::Conflict(_)))
        ));
        assert_eq!(handle.requested_tokens(), vec![0]);
    }

    #[rstest]
    #[case("local_apply", MutationPolicy::LocalApply)]
    #[case("refetch", MutationPolicy::Refetch)]
    fn test_ポリシーを文字列からパースできる(
        #[case] input: &str,
        #[case] expected: MutationPolicy,
    ) {
        assert_eq!(MutationPolicy::from_str(input).unwrap(), expected);
    }
}
