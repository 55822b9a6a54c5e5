//! # Observability 基盤
//!
//! トレーシング初期化とログ出力形式の設定を提供する。
//! ビューアーバイナリとテストハーネスで共通のログ初期化ロジックを集約し、
//! 環境変数 `LOG_FORMAT` による JSON / Pretty 出力の切り替えに対応する。

/// ログ出力形式
///
/// 環境変数 `LOG_FORMAT` で切り替える。
/// 値が未設定または不正な場合は [`Pretty`](LogFormat::Pretty) にフォールバックする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON 形式（集約基盤向け）
    Json,
    /// 人間が読みやすい形式（開発環境向け）
    #[default]
    Pretty,
}

impl LogFormat {
    /// 文字列からログ形式をパースする
    ///
    /// 不正な値の場合は [`Pretty`](LogFormat::Pretty) にフォールバックし、
    /// stderr に警告を出力する（subscriber 初期化前のため tracing は使えない）。
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            other => {
                eprintln!("WARNING: unknown LOG_FORMAT={other:?}, falling back to pretty");
                Self::Pretty
            }
        }
    }
}

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_FILTER: &str = "info,crmdash=debug";

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// サービス名（全ログの `service` フィールド）
    pub service_name: String,
    /// ログ出力形式
    pub log_format:   LogFormat,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
        }
    }

    /// 環境変数から設定を読み取る
    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self::from_lookup(service_name, |key| std::env::var(key).ok())
    }

    /// 任意の参照関数から設定を読み取る
    pub fn from_lookup(
        service_name: impl Into<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let log_format = lookup("LOG_FORMAT")
            .map(|value| LogFormat::parse(&value))
            .unwrap_or_default();
        Self::new(service_name, log_format)
    }
}

/// フィルタ・出力層・`ErrorLayer` を重ねた subscriber を組み立てる
///
/// グローバルには登録しない。テストでは `tracing::subscriber::with_default` と組み合わせる。
#[cfg(feature = "observability")]
pub fn build_subscriber(config: &TracingConfig) -> impl tracing::Subscriber + Send + Sync + 'static {
    use tracing_subscriber::{Layer as _, layer::SubscriberExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
}

/// サービス名を `service` フィールドに持つルートスパン
#[cfg(feature = "observability")]
pub fn service_span(config: &TracingConfig) -> tracing::Span {
    tracing::info_span!("app", service = %config.service_name)
}

/// トレーシングを初期化する
///
/// `RUST_LOG` 環境変数でログレベルを制御可能。未設定の場合は [`DEFAULT_FILTER`]。
///
/// `tracing_error::ErrorLayer` を登録するため、インフラ層エラーが生成時に
/// キャプチャする `SpanTrace` にスパン情報が載る。
///
/// 戻り値のスパンガードを保持している間、すべてのログに `service` フィールドが付く。
#[cfg(feature = "observability")]
pub fn init_tracing(config: TracingConfig) -> tracing::span::EnteredSpan {
    use tracing_subscriber::util::SubscriberInitExt;

    build_subscriber(&config).init();
    service_span(&config).entered()
}
