//! Helpdesk クライアントの設定構造体。

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::HelpdeskError;

/// API URL の環境変数名。
pub const ENV_API_URL: &str = "HELPDESK_API_URL";
/// API キーの環境変数名。
pub const ENV_API_KEY: &str = "HELPDESK_API_KEY";
/// トークンキャッシュ TTL（分）の環境変数名。
pub const ENV_TOKEN_CACHE_TTL: &str = "HELPDESK_TOKEN_CACHE_TTL";
/// デバッグログ有効化の環境変数名。
pub const ENV_DEBUG: &str = "HELPDESK_DEBUG";

/// token_cache_ttl のデフォルト値（55 分）。
fn default_token_cache_ttl() -> u64 {
    55
}

/// HelpdeskConfig は Helpdesk API クライアントの設定を表す。
///
/// YAML または環境変数から読み込める。API キーは `SecretString` で保持し、
/// `Debug` 出力には現れない。
#[derive(Debug, Clone, Deserialize)]
pub struct HelpdeskConfig {
    /// Helpdesk API のベース URL。末尾のスラッシュは除去される。
    /// 例: `https://helpdesk.example.com`
    pub api_url: String,

    /// サービス識別用の API キー。全リクエストの `X-Service-Key` ヘッダーに付与する。
    pub api_key: SecretString,

    /// アクセストークンのキャッシュ TTL（分、デフォルト: 55 分）。0 でキャッシュ無効。
    #[serde(default = "default_token_cache_ttl")]
    pub token_cache_ttl: u64,

    /// true の場合のみ API 呼び出しの失敗をエラーログに出力する。
    #[serde(default)]
    pub debug: bool,
}

/// YAML ファイルのルート。`helpdesk:` セクションのみを読む。
#[derive(Deserialize)]
struct YamlRoot {
    helpdesk: HelpdeskConfig,
}

impl HelpdeskConfig {
    /// 最小限の設定で HelpdeskConfig を生成する。
    ///
    /// `token_cache_ttl` と `debug` はデフォルト値が使用される。
    pub fn new(api_url: &str, api_key: &str) -> Self {
        Self {
            api_url: normalize_url(api_url),
            api_key: SecretString::new(api_key.to_string()),
            token_cache_ttl: default_token_cache_ttl(),
            debug: false,
        }
    }

    /// トークンキャッシュ TTL（分）を設定する。
    pub fn with_token_cache_ttl(mut self, minutes: u64) -> Self {
        self.token_cache_ttl = minutes;
        self
    }

    /// デバッグログの有効・無効を設定する。
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// API キーの生の値を返す。
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// YAML 文字列から設定を読み込む。
    pub fn from_yaml_str(yaml: &str) -> Result<Self, HelpdeskError> {
        let root: YamlRoot = serde_yaml::from_str(yaml)?;
        let mut config = root.helpdesk;
        config.api_url = normalize_url(&config.api_url);
        Ok(config)
    }

    /// YAML ファイルから設定を読み込む。
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, HelpdeskError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// 環境変数から設定を読み込む。
    pub fn from_env() -> Result<Self, HelpdeskError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー検索関数から設定を読み込む。`from_env` の実体。
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, HelpdeskError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(ENV_API_URL)
            .ok_or_else(|| HelpdeskError::Config(format!("{ENV_API_URL} is required")))?;
        let api_key = lookup(ENV_API_KEY)
            .ok_or_else(|| HelpdeskError::Config(format!("{ENV_API_KEY} is required")))?;

        let mut config = Self::new(&api_url, &api_key);

        if let Some(ttl) = lookup(ENV_TOKEN_CACHE_TTL) {
            config.token_cache_ttl = ttl.trim().parse().map_err(|_| {
                HelpdeskError::Config(format!(
                    "{ENV_TOKEN_CACHE_TTL} must be a non-negative integer: {ttl}"
                ))
            })?;
        }
        if let Some(debug) = lookup(ENV_DEBUG) {
            config.debug = parse_bool(&debug);
        }

        Ok(config)
    }

    /// 設定値のバリデーション。
    pub fn validate(&self) -> Result<(), HelpdeskError> {
        if self.api_url.is_empty() {
            return Err(HelpdeskError::Config("api_url is required".into()));
        }
        let parsed = url::Url::parse(&self.api_url)
            .map_err(|e| HelpdeskError::Config(format!("api_url is invalid: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HelpdeskError::Config(
                "api_url must use http or https".into(),
            ));
        }
        if self.api_key().is_empty() {
            return Err(HelpdeskError::Config("api_key is required".into()));
        }
        Ok(())
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
