//! HTTP データソース
//!
//! データ API の `GET {base_url}/{resource}?token=N[&q=...]` を呼び出す。
//!
//! ## レスポンス
//!
//! - 2xx: [`PaginatedResponse`]（`{ "data": [...], "next_token": N, "has_more": bool }`）
//! - それ以外: RFC 9457 エラーボディ（[`ErrorResponse`]）。読めなければ本文をそのまま使う

use std::marker::PhantomData;

use async_trait::async_trait;
use crmdash_domain::{
    pagination::{PageRequest, PageResult, PageToken},
    record::Record,
};
use crmdash_shared::{ErrorResponse, PaginatedResponse};
use serde::de::DeserializeOwned;
use url::Url;

use super::DataSource;
use crate::error::InfraError;

/// HTTP データソース
pub struct HttpDataSource<T> {
    base_url: Url,
    client:   reqwest::Client,
    _record:  PhantomData<fn() -> T>,
}

impl<T> Clone for HttpDataSource<T> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            client:   self.client.clone(),
            _record:  PhantomData,
        }
    }
}

impl<T: Record> HttpDataSource<T> {
    /// 新しい HttpDataSource を作成する
    ///
    /// # 引数
    ///
    /// - `base_url`: データ API のベース URL（例: `http://localhost:13000/api`）
    ///
    /// # Errors
    ///
    /// URL として解釈できない、または `http`/`https` 以外の場合は入力エラー。
    pub fn new(base_url: &str) -> Result<Self, InfraError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, InfraError> {
        let base_url = Url::parse(base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(InfraError::invalid_input(format!(
                "未対応のスキームです: {}",
                base_url.scheme()
            )));
        }

        Ok(Self {
            base_url,
            client,
            _record: PhantomData,
        })
    }

    /// リクエスト先の URL を組み立てる
    pub fn page_url(&self, request: &PageRequest) -> Result<Url, InfraError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| InfraError::invalid_input("ベース URL にパスを追加できません"))?
            .pop_if_empty()
            .push(T::KIND.resource());

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("token", &request.token.to_string());
            if let Some(q) = &request.query {
                query.append_pair("q", q);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl<T> DataSource<T> for HttpDataSource<T>
where
    T: Record + DeserializeOwned,
{
    #[tracing::instrument(skip_all, fields(kind = %T::KIND.resource(), token = %request.token))]
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResult<T>, InfraError> {
        let url = self.page_url(request)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|problem| problem.detail)
                .unwrap_or(body);
            tracing::debug!(status = status.as_u16(), %detail, "データソースがエラーを返した");
            return Err(InfraError::status(status.as_u16(), detail));
        }

        let bytes = response.bytes().await?;
        let body: PaginatedResponse<T> = serde_json::from_slice(&bytes)?;

        Ok(PageResult::new(
            body.data,
            PageToken::new(body.next_token),
            body.has_more,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crmdash_domain::record::{Email, Project};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("http://localhost:13000", "http://localhost:13000/emails?token=0")]
    #[case("http://localhost:13000/", "http://localhost:13000/emails?token=0")]
    #[case("http://localhost:13000/api", "http://localhost:13000/api/emails?token=0")]
    #[case("http://localhost:13000/api/", "http://localhost:13000/api/emails?token=0")]
    fn test_ベースurlにリソースパスを連結する(#[case] base: &str, #[case] expected: &str) {
        let source = HttpDataSource::<Email>::new(base).unwrap();

        let url = source.page_url(&PageRequest::new(PageToken::initial())).unwrap();

        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn test_クエリはエンコードされて付与される() {
        let source = HttpDataSource::<Project>::new("http://localhost:13000").unwrap();
        let request = PageRequest::with_query(PageToken::new(2), Some("web & app".to_string()));

        let url = source.page_url(&request).unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:13000/projects?token=2&q=web+%26+app"
        );
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://example.com")]
    fn test_不正なベースurlは入力エラーになる(#[case] base: &str) {
        let result = HttpDataSource::<Email>::new(base);

        assert!(matches!(
            result.map(|_| ()).unwrap_err().kind(),
            crate::InfraErrorKind::InvalidInput(_)
        ));
    }
}
