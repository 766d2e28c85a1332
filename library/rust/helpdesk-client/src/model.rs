//! 各 API 操作の成功時ペイロード。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// API キー検証の結果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyValidation {
    /// API キーに紐づく会社情報（レスポンスに含まれない場合は `None`）。
    pub company: Option<Value>,
}

/// ユーザー存在確認の結果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLookup {
    /// レスポンスに `exists` が無い場合は false。
    pub exists: bool,
    pub user: Option<Value>,
}

/// アクセストークン取得の結果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
    /// キャッシュから返した場合は true（ネットワーク呼び出しなし）。
    pub from_cache: bool,
}

/// レスポンス JSON からオブジェクト値を取り出す。null や欠落は `None`。
pub(crate) fn optional_field(data: &Value, field: &str) -> Option<Value> {
    match data.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.clone()),
    }
}

/// レスポンス JSON から空でない文字列を取り出す。
pub(crate) fn non_empty_str<'a>(data: &'a Value, field: &str) -> Option<&'a str> {
    data.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
