//! Helpdesk API への HTTP トランスポート。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

use crate::config::HelpdeskConfig;
use crate::error::{HelpdeskError, TransportError};

/// API キーを送るヘッダー名。
pub const SERVICE_KEY_HEADER: &str = "X-Service-Key";

/// 全リクエスト共通のタイムアウト。
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HttpTransport は Helpdesk API へ JSON を POST する抽象。
///
/// `ReqwestTransport` がデフォルト実装。テスト時は `MockHttpTransport` が使用可能。
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// ベース URL からの相対パスへ POST し、レスポンスの JSON を返す。
    ///
    /// 空のレスポンスボディは `Value::Null` として返す。
    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, TransportError>;
}

/// ReqwestTransport は reqwest を使った HttpTransport の実装。
///
/// `Accept` / `Content-Type` / `X-Service-Key` ヘッダーと 30 秒のタイムアウトを
/// すべてのリクエストに付与する。
pub struct ReqwestTransport {
    base_url: String,
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// 設定から ReqwestTransport を生成する。
    pub fn new(config: &HelpdeskConfig) -> Result<Self, HelpdeskError> {
        let mut service_key = HeaderValue::from_str(config.api_key())
            .map_err(|e| HelpdeskError::Config(format!("api_key is not a valid header value: {e}")))?;
        service_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(SERVICE_KEY_HEADER, service_key);

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| HelpdeskError::Http(e.to_string()))?;

        Ok(Self {
            base_url: config.api_url.clone(),
            http_client,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Helpdesk API へリクエストを送信します");

        let mut request = self.http_client.post(&url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
