//! 埋め込みウィジェットの URL 組み立て。

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// ウィジェットに渡すユーザー情報。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetUser {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl WidgetUser {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            first_name: None,
            last_name: None,
        }
    }

    pub fn with_name(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = Some(first_name.to_string());
        self.last_name = Some(last_name.to_string());
        self
    }
}

/// ウィジェット URL を組み立てる。
///
/// トークンなしの場合は `/widget` に API キーとユーザー情報を付与する。
/// トークンありの場合は `/widget/tickets` に `token` パラメータのみを付与し、
/// API キーとユーザー情報は含めない。空文字列のトークンはトークンなしとして扱う。
pub fn build_widget_url(
    api_url: &str,
    api_key: &str,
    user: &WidgetUser,
    token: Option<&str>,
) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());

    let path = match token {
        Some(token) if !token.is_empty() => {
            query.append_pair("token", token);
            "/widget/tickets"
        }
        _ => {
            query
                .append_pair("api_key", api_key)
                .append_pair("email", &user.email)
                .append_pair("first_name", user.first_name.as_deref().unwrap_or_default())
                .append_pair("last_name", user.last_name.as_deref().unwrap_or_default());
            "/widget"
        }
    };

    format!("{api_url}{path}?{}", query.finish())
}
