//! HttpDataSource の結合テスト
//!
//! axum でプロセス内にデータ API を立て、ワイヤ形式とエラー変換を検証する。
//!
//! 実行方法:
//! ```bash
//! cargo test -p crmdash-infra --test http_data_source_test
//! ```

use std::collections::HashMap;

use axum::{
    Json,
    Router,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use crmdash_domain::{
    pagination::{PageRequest, PageToken},
    record::{Email, EmailStatus},
    value_objects::{ContactEmail, EmailSubject, RecordId},
};
use crmdash_infra::{DataSource, HttpDataSource, InfraErrorKind};
use crmdash_shared::{ErrorResponse, PaginatedResponse};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn email(token: u64, index: u64) -> Email {
    Email {
        id:        RecordId::new(format!("{token}-{index}")).unwrap(),
        subject:   EmailSubject::new(format!("Email Subject {}", token * 10 + index + 1)).unwrap(),
        recipient: ContactEmail::new(format!("recipient{}@example.com", index + 1)).unwrap(),
        status:    EmailStatus::Sent,
        sent_at:   DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
        template:  Some("Template A".to_string()),
    }
}

/// `GET /api/emails?token=N[&q=...]`
///
/// - token 0..=2: 2 件ずつ返す（token 2 が最終ページ）
/// - token 7: 503 + RFC 9457 ボディ
/// - token 8: 500 + プレーンテキスト
/// - token 9: 壊れた JSON
async fn emails(Query(params): Query<HashMap<String, String>>) -> Response {
    let token: u64 = params
        .get("token")
        .and_then(|t| t.parse().ok())
        .unwrap_or_default();

    match token {
        7 => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::service_unavailable("メンテナンス中です")),
        )
            .into_response(),
        8 => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        9 => (StatusCode::OK, "{\"data\": [").into_response(),
        _ => {
            let query = params.get("q").map(|q| q.to_lowercase());
            let data: Vec<Email> = (0..2)
                .map(|i| email(token, i))
                .filter(|e| {
                    query
                        .as_deref()
                        .is_none_or(|q| e.subject.as_str().to_lowercase().contains(q))
                })
                .collect();
            Json(PaginatedResponse::new(data, token + 1, token < 2)).into_response()
        }
    }
}

/// テストサーバーを起動し、ベース URL を返す
async fn spawn_server() -> String {
    let app = Router::new().route("/api/emails", get(emails));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

#[tokio::test]
async fn test_ページを取得してドメイン型に変換する() {
    let source = HttpDataSource::<Email>::new(&spawn_server().await).unwrap();

    let page = source
        .fetch_page(&PageRequest::new(PageToken::new(1)))
        .await
        .unwrap();

    assert_eq!(page.items, vec![email(1, 0), email(1, 1)]);
    assert_eq!(page.next_token, PageToken::new(2));
    assert!(page.has_more);
}

#[tokio::test]
async fn test_最終ページはhas_moreがfalse() {
    let source = HttpDataSource::<Email>::new(&spawn_server().await).unwrap();

    let page = source
        .fetch_page(&PageRequest::new(PageToken::new(2)))
        .await
        .unwrap();

    assert!(!page.has_more);
}

#[tokio::test]
async fn test_クエリはサーバーに渡される() {
    let source = HttpDataSource::<Email>::new(&spawn_server().await).unwrap();
    let request = PageRequest::with_query(PageToken::initial(), Some("subject 2".to_string()));

    let page = source.fetch_page(&request).await.unwrap();

    assert_eq!(page.items, vec![email(0, 1)]);
}

#[rstest]
#[case(7, 503, "メンテナンス中です", true)]
#[case(8, 500, "boom", true)]
#[tokio::test]
async fn test_エラーステータスはstatusエラーになる(
    #[case] token: u64,
    #[case] expected_status: u16,
    #[case] expected_detail: &str,
    #[case] retryable: bool,
) {
    let source = HttpDataSource::<Email>::new(&spawn_server().await).unwrap();

    let err = source
        .fetch_page(&PageRequest::new(PageToken::new(token)))
        .await
        .unwrap_err();

    match err.kind() {
        InfraErrorKind::Status { status, detail } => {
            assert_eq!(*status, expected_status);
            assert_eq!(detail, expected_detail);
        }
        other => panic!("Status エラーを期待したが {other:?}"),
    }
    assert_eq!(err.is_retryable(), retryable);
}

#[tokio::test]
async fn test_壊れたjsonはシリアライズエラーになる() {
    let source = HttpDataSource::<Email>::new(&spawn_server().await).unwrap();

    let err = source
        .fetch_page(&PageRequest::new(PageToken::new(9)))
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), InfraErrorKind::Serialization(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_未知のリソースは404になる() {
    let base = spawn_server().await;
    let source = HttpDataSource::<crmdash_domain::record::Project>::new(&base).unwrap();

    let err = source
        .fetch_page(&PageRequest::new(PageToken::initial()))
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), InfraErrorKind::Status { status: 404, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_接続できないサーバーはhttpエラーで再試行可能() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let source = HttpDataSource::<Email>::new(&format!("http://{addr}")).unwrap();

    let err = source
        .fetch_page(&PageRequest::new(PageToken::initial()))
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), InfraErrorKind::Http(_)));
    assert!(err.is_retryable());
}
