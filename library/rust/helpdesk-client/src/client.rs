//! Helpdesk API クライアント本体。

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, error, warn};

use crate::cache::{token_cache_key, InMemoryTokenCache, TokenCache};
use crate::config::HelpdeskConfig;
use crate::error::{HelpdeskError, HelpdeskFailure, TransportError};
use crate::model::{non_empty_str, optional_field, ApiKeyValidation, AuthToken, UserLookup};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::widget::{build_widget_url, WidgetUser};

/// API キー検証エンドポイント。
pub const VALIDATE_KEY_PATH: &str = "/api/external/validate-key";
/// ユーザー存在確認エンドポイント。
pub const CHECK_USER_PATH: &str = "/api/external/check-user";
/// ログイン（トークン発行）エンドポイント。
pub const LOGIN_PATH: &str = "/api/external/login";

const DEFAULT_TOKEN_ERROR: &str = "error obtaining token";

/// HelpdeskClient は Helpdesk API の呼び出しとトークンキャッシュ方針をまとめる。
///
/// トランスポートとキャッシュはホストが所有する共有リソースとして受け取り、
/// クライアント自身は不変の設定以外の状態を持たない。
/// 同一メールアドレスへの同時呼び出しはどちらもログインし得る（後勝ち）。
pub struct HelpdeskClient {
    config: HelpdeskConfig,
    transport: Arc<dyn HttpTransport>,
    cache: Arc<dyn TokenCache>,
}

impl HelpdeskClient {
    /// 任意のトランスポートとキャッシュで HelpdeskClient を生成する。
    ///
    /// 設定が不正な場合（API URL・API キーの欠落など）はエラーを返す。
    pub fn new(
        config: HelpdeskConfig,
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn TokenCache>,
    ) -> Result<Self, HelpdeskError> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            cache,
        })
    }

    /// reqwest トランスポートとインメモリキャッシュで HelpdeskClient を生成する。
    pub fn from_config(config: HelpdeskConfig) -> Result<Self, HelpdeskError> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Self::new(
            config,
            Arc::new(transport),
            Arc::new(InMemoryTokenCache::new()),
        )
    }

    pub fn config(&self) -> &HelpdeskConfig {
        &self.config
    }

    /// API キーが有効か検証する。キャッシュは使わず毎回問い合わせる。
    pub async fn validate_api_key(&self) -> Result<ApiKeyValidation, HelpdeskFailure> {
        match self.transport.post(VALIDATE_KEY_PATH, None).await {
            Ok(data) => Ok(ApiKeyValidation {
                company: optional_field(&data, "company"),
            }),
            Err(e) => {
                self.log_error("validate_api_key", &e);
                Err(HelpdeskFailure::InvalidApiKey)
            }
        }
    }

    /// ユーザーが Helpdesk に存在するか確認する。
    pub async fn check_user_exists(&self, email: &str) -> Result<UserLookup, HelpdeskFailure> {
        if email.is_empty() {
            return Err(HelpdeskFailure::MissingEmail);
        }

        match self
            .transport
            .post(CHECK_USER_PATH, Some(json!({ "email": email })))
            .await
        {
            Ok(data) => Ok(UserLookup {
                exists: data
                    .get("exists")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false),
                user: optional_field(&data, "user"),
            }),
            Err(e) => {
                self.log_error("check_user_exists", &e);
                Err(HelpdeskFailure::UserCheck)
            }
        }
    }

    /// ユーザーのアクセストークンを取得する。
    ///
    /// キャッシュに空でないトークンがあればネットワークを使わずに返す。
    /// キャッシュミス時はログインし、取得したトークンを `token_cache_ttl` 分キャッシュする。
    /// キャッシュ済みトークンがサーバー側で失効していても検知しない。
    pub async fn get_auth_token(&self, email: &str) -> Result<AuthToken, HelpdeskFailure> {
        if email.is_empty() {
            return Err(HelpdeskFailure::MissingEmail);
        }

        let cache_key = token_cache_key(email);

        // まずキャッシュを確認し、ヒットすればネットワークを使わずに返す
        match self.cache.get(&cache_key).await {
            Ok(Some(token)) if !token.is_empty() => {
                debug!(cache_key = %cache_key, "キャッシュ済みトークンを返します");
                return Ok(AuthToken {
                    token,
                    from_cache: true,
                });
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, cache_key = %cache_key, "トークンキャッシュの読み取りに失敗しました");
            }
        }

        // キャッシュミスなのでログインエンドポイントからトークンを取得する
        debug!(cache_key = %cache_key, "トークンを取得するためログインします");

        let data = match self
            .transport
            .post(LOGIN_PATH, Some(json!({ "email": email })))
            .await
        {
            Ok(data) => data,
            Err(e) => {
                self.log_error("get_auth_token", &e);
                return Err(HelpdeskFailure::Authentication);
            }
        };

        let Some(token) = non_empty_str(&data, "accessToken") else {
            let message = non_empty_str(&data, "message").unwrap_or(DEFAULT_TOKEN_ERROR);
            return Err(HelpdeskFailure::TokenRejected(message.to_string()));
        };

        // TTL は分単位。0 の場合はキャッシュしない
        if self.config.token_cache_ttl > 0 {
            let ttl = Duration::from_secs(self.config.token_cache_ttl.saturating_mul(60));
            if let Err(e) = self.cache.put(&cache_key, token, ttl).await {
                warn!(error = %e, cache_key = %cache_key, "トークンのキャッシュに失敗しました");
            }
        }

        Ok(AuthToken {
            token: token.to_string(),
            from_cache: false,
        })
    }

    /// ウィジェット URL を組み立てる。I/O は行わない。
    ///
    /// `token` がある場合はチケット一覧への認証済みディープリンクになる。
    pub fn widget_url(&self, user: &WidgetUser, token: Option<&str>) -> String {
        build_widget_url(&self.config.api_url, self.config.api_key(), user, token)
    }

    /// トークンを取得して認証済みウィジェット URL を返す。
    ///
    /// トークンが取得できない場合は API キーによる匿名ウィジェット URL を返す。
    pub async fn authenticated_widget_url(&self, user: &WidgetUser) -> String {
        match self.get_auth_token(&user.email).await {
            Ok(auth) => self.widget_url(user, Some(&auth.token)),
            Err(failure) => {
                debug!(reason = %failure, "匿名ウィジェット URL にフォールバックします");
                self.widget_url(user, None)
            }
        }
    }

    /// ユーザーのキャッシュ済みトークンを破棄する。存在しなくてもエラーにしない。
    pub async fn invalidate_token_cache(&self, email: &str) {
        if email.is_empty() {
            return;
        }
        let cache_key = token_cache_key(email);
        if let Err(e) = self.cache.forget(&cache_key).await {
            warn!(error = %e, cache_key = %cache_key, "トークンキャッシュの削除に失敗しました");
        }
    }

    fn log_error(&self, operation: &str, err: &TransportError) {
        if self.config.debug {
            error!(
                operation = operation,
                message = %err,
                code = err.code(),
                "Helpdesk API 呼び出しに失敗しました"
            );
        }
    }
}
