//! k1s0-helpdesk-client: Helpdesk API 連携ライブラリ。
//!
//! ホストアプリケーションのユーザーを外部サポートポータル（Helpdesk）へ
//! シングルサインオンさせるためのクライアント。API キー検証・ユーザー存在確認・
//! アクセストークンの取得とキャッシュ・埋め込みウィジェット URL の組み立てを提供する。
//!
//! # 使い方
//!
//! ```ignore
//! use k1s0_helpdesk_client::{HelpdeskClient, HelpdeskConfig, WidgetUser};
//!
//! let config = HelpdeskConfig::new("https://helpdesk.example.com", "my-service-key")
//!     .with_token_cache_ttl(55);
//! let client = HelpdeskClient::from_config(config)?;
//!
//! // キャッシュ付きトークン取得（TTL 内はネットワークを使わない）
//! let auth = client.get_auth_token("user@example.com").await?;
//!
//! // チケット一覧への認証済みディープリンク
//! let user = WidgetUser::new("user@example.com").with_name("Taro", "Yamada");
//! let url = client.widget_url(&user, Some(&auth.token));
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod transport;
pub mod widget;

pub use cache::{token_cache_key, InMemoryTokenCache, TokenCache};
pub use client::HelpdeskClient;
pub use config::HelpdeskConfig;
pub use error::{CacheError, HelpdeskError, HelpdeskFailure, TransportError};
pub use model::{ApiKeyValidation, AuthToken, UserLookup};
pub use transport::{HttpTransport, ReqwestTransport};
pub use widget::{build_widget_url, WidgetUser};

#[cfg(feature = "mock")]
pub use cache::MockTokenCache;
#[cfg(feature = "mock")]
pub use transport::MockHttpTransport;
