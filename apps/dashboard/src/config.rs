//! # ダッシュボード設定
//!
//! 環境変数からリストビューアの設定を読み込む。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `LIST_KIND` | No | `customers` / `invoices` / `projects` / `emails` / `surveys`（デフォルト: `emails`） |
//! | `DATA_SOURCE` | No | `seeded` / `http`（デフォルト: `seeded`） |
//! | `DATA_SOURCE_URL` | `DATA_SOURCE=http` の場合 | データ API のベース URL |
//! | `PAGE_SIZE` | No | シードデータの 1 ページの件数（デフォルト: 10） |
//! | `PAGE_LIMIT` | No | シードデータのページ数（デフォルト: 6） |
//! | `FETCH_DELAY_MS` | No | シードデータの応答遅延（デフォルト: 1000） |
//! | `FETCH_TIMEOUT_MS` | No | 1 回の取得のタイムアウト（デフォルト: 10000） |
//! | `SEED` | No | シードデータの乱数シード（デフォルト: 42） |
//! | `FILTER_MODE` | No | `client_side` / `server_query`（デフォルト: `client_side`） |
//! | `MUTATION_POLICY` | No | `local_apply` / `refetch`（デフォルト: `local_apply`） |
//! | `DELETE_ID` | No | 読み込み後に削除するレコード ID（未設定なら変更操作を行わない） |
//!
//! ログ形式（`LOG_FORMAT`）は `crmdash_shared::observability::TracingConfig` が読む。

use std::{env, str::FromStr, sync::Arc, time::Duration};

use crmdash_domain::{clock::Clock, filter::FilterMode, record::RecordKind};
use crmdash_infra::Notifier;
use thiserror::Error;

use crate::usecase::{MutationPolicy, MutationService, SessionConfig};

/// 設定読み込みエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値を解釈できない
    #[error("{key} の値が不正です: {value}")]
    Invalid { key: &'static str, value: String },
}

/// データソースの種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceConfig {
    /// シードデータ
    Seeded {
        seed:       u64,
        page_size:  usize,
        page_limit: u64,
        delay:      Duration,
    },
    /// HTTP データ API
    Http { base_url: String },
}

/// リストビューアの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// 表示するリスト
    pub list_kind:       RecordKind,
    /// データソース
    pub data_source:     DataSourceConfig,
    /// 1 回の取得のタイムアウト
    pub fetch_timeout:   Duration,
    /// 検索フィルタの適用場所
    pub filter_mode:     FilterMode,
    /// 変更操作の反映方法
    pub mutation_policy: MutationPolicy,
    /// 読み込み後に削除するレコード ID
    pub delete_id:       Option<String>,
}

impl DashboardConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の参照関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let list_kind = match lookup("LIST_KIND") {
            None => RecordKind::Email,
            Some(value) => RecordKind::from_resource(&value).ok_or(ConfigError::Invalid {
                key: "LIST_KIND",
                value,
            })?,
        };

        let data_source = match lookup("DATA_SOURCE").as_deref() {
            None | Some("seeded") => DataSourceConfig::Seeded {
                seed:       parse_or(&lookup, "SEED", 42)?,
                page_size:  parse_or(&lookup, "PAGE_SIZE", 10)?,
                page_limit: parse_or(&lookup, "PAGE_LIMIT", 6)?,
                delay:      Duration::from_millis(parse_or(&lookup, "FETCH_DELAY_MS", 1000)?),
            },
            Some("http") => DataSourceConfig::Http {
                base_url: lookup("DATA_SOURCE_URL").ok_or(ConfigError::Missing("DATA_SOURCE_URL"))?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key:   "DATA_SOURCE",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            list_kind,
            data_source,
            fetch_timeout: Duration::from_millis(parse_or(&lookup, "FETCH_TIMEOUT_MS", 10_000)?),
            filter_mode: parse_or(&lookup, "FILTER_MODE", FilterMode::default())?,
            mutation_policy: parse_or(&lookup, "MUTATION_POLICY", MutationPolicy::default())?,
            delete_id: lookup("DELETE_ID")
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
        })
    }

    /// リストセッションの設定
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            fetch_timeout: self.fetch_timeout,
            filter_mode:   self.filter_mode,
        }
    }

    /// 設定された反映方法で変更操作サービスを組み立てる
    pub fn mutation_service(
        &self,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> MutationService {
        MutationService::new(notifier, clock, self.mutation_policy)
    }
}

/// 環境変数を解釈する（未設定ならデフォルト値）
fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crmdash_domain::clock::SystemClock;
    use crmdash_infra::LogNotifier;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_未設定ならデフォルト値になる() {
        let config = DashboardConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(
            config,
            DashboardConfig {
                list_kind:       RecordKind::Email,
                data_source:     DataSourceConfig::Seeded {
                    seed:       42,
                    page_size:  10,
                    page_limit: 6,
                    delay:      Duration::from_millis(1000),
                },
                fetch_timeout:   Duration::from_secs(10),
                filter_mode:     FilterMode::ClientSide,
                mutation_policy: MutationPolicy::LocalApply,
                delete_id:       None,
            }
        );
    }

    #[test]
    fn test_すべての値を上書きできる() {
        let config = DashboardConfig::from_lookup(lookup_from(&[
            ("LIST_KIND", "projects"),
            ("DATA_SOURCE", "http"),
            ("DATA_SOURCE_URL", "http://localhost:13000/api"),
            ("FETCH_TIMEOUT_MS", "2500"),
            ("FILTER_MODE", "server_query"),
            ("MUTATION_POLICY", "refetch"),
            ("DELETE_ID", " 0-3 "),
        ]))
        .unwrap();

        assert_eq!(config.list_kind, RecordKind::Project);
        assert_eq!(
            config.data_source,
            DataSourceConfig::Http {
                base_url: "http://localhost:13000/api".to_string(),
            }
        );
        assert_eq!(config.session_config().fetch_timeout, Duration::from_millis(2500));
        assert_eq!(config.filter_mode, FilterMode::ServerQuery);
        assert_eq!(config.mutation_policy, MutationPolicy::Refetch);
        assert_eq!(config.delete_id.as_deref(), Some("0-3"));
    }

    #[test]
    fn test_空のdelete_idは未設定として扱う() {
        let config = DashboardConfig::from_lookup(lookup_from(&[("DELETE_ID", "  ")])).unwrap();

        assert_eq!(config.delete_id, None);
    }

    #[rstest]
    #[case(None, MutationPolicy::LocalApply)]
    #[case(Some("refetch"), MutationPolicy::Refetch)]
    fn test_変更操作サービスは設定の反映方法を使う(
        #[case] policy: Option<&str>,
        #[case] expected: MutationPolicy,
    ) {
        let pairs: Vec<(&str, &str)> = policy.map(|p| ("MUTATION_POLICY", p)).into_iter().collect();
        let config = DashboardConfig::from_lookup(lookup_from(&pairs)).unwrap();

        let service = config.mutation_service(Arc::new(LogNotifier), Arc::new(SystemClock));

        assert_eq!(service.policy(), expected);
    }

    #[test]
    fn test_httpでurlがないとmissingになる() {
        let result = DashboardConfig::from_lookup(lookup_from(&[("DATA_SOURCE", "http")]));

        assert_eq!(result, Err(ConfigError::Missing("DATA_SOURCE_URL")));
    }

    #[rstest]
    #[case("LIST_KIND", "deals")]
    #[case("DATA_SOURCE", "grpc")]
    #[case("PAGE_SIZE", "ten")]
    #[case("SEED", "-1")]
    #[case("FILTER_MODE", "everywhere")]
    #[case("MUTATION_POLICY", "optimistic")]
    fn test_不正な値はinvalidになる(#[case] key: &'static str, #[case] value: &str) {
        let result = DashboardConfig::from_lookup(lookup_from(&[(key, value)]));

        assert_eq!(
            result,
            Err(ConfigError::Invalid {
                key,
                value: value.to_string(),
            })
        );
    }
}
