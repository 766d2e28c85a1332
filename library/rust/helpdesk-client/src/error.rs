//! Helpdesk クライアントのエラー定義。

/// HelpdeskError はクライアント生成・設定読み込み時に発生するエラーを表す。
///
/// 各 API 操作の失敗は `HelpdeskFailure` で表し、こちらは致命的な構築エラーに限る。
#[derive(thiserror::Error, Debug)]
pub enum HelpdeskError {
    /// 設定値が不正。
    #[error("設定エラー: {0}")]
    Config(String),

    /// HTTP クライアントの生成に失敗した。
    #[error("HTTP クライアント生成失敗: {0}")]
    Http(String),

    /// 設定ファイルの読み込みに失敗した。
    #[error("設定ファイル読み込み失敗: {0}")]
    ReadFile(#[from] std::io::Error),

    /// 設定ファイルの YAML 解析に失敗した。
    #[error("YAML 解析失敗: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
}

/// TransportError は HTTP トランスポート層で発生するエラーを表す。
///
/// ネットワークエラー・タイムアウト・非 2xx 応答・不正な JSON はすべてここに集約され、
/// 呼び出し側には操作ごとの固定メッセージとしてのみ伝わる。
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// リクエスト送信に失敗した（接続エラー・タイムアウトを含む）。
    #[error("リクエスト失敗: {0}")]
    Request(String),

    /// 2xx 以外のステータスが返された。
    #[error("HTTP {status} - {body}")]
    Status { status: u16, body: String },

    /// レスポンスボディの JSON 解析に失敗した。
    #[error("レスポンス解析失敗: {0}")]
    Decode(String),
}

impl TransportError {
    /// ログ出力用のエラーコード。HTTP ステータスがあればその値、なければ 0。
    pub fn code(&self) -> u16 {
        match self {
            Self::Status { status, .. } => *status,
            Self::Request(_) | Self::Decode(_) => 0,
        }
    }
}

/// CacheError はトークンキャッシュのバックエンドで発生するエラーを表す。
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("キャッシュバックエンドエラー: {0}")]
    Backend(String),
}

/// HelpdeskFailure は各 API 操作の失敗を呼び出し側向けのメッセージで表す。
///
/// トランスポートの詳細は含めない。詳細は debug 設定時のみログに出力される。
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HelpdeskFailure {
    /// API キー検証に失敗した。
    #[error("API key invalid or service unavailable")]
    InvalidApiKey,

    /// ユーザー存在確認に失敗した。
    #[error("error verifying user")]
    UserCheck,

    /// ログインエンドポイントがトークンを返さなかった。
    #[error("{0}")]
    TokenRejected(String),

    /// ログインリクエスト自体が失敗した。
    #[error("authentication error")]
    Authentication,

    /// メールアドレスが空。
    #[error("email is required")]
    MissingEmail,
}

impl HelpdeskFailure {
    /// 呼び出し側に返すメッセージ。
    pub fn message(&self) -> String {
        self.to_string()
    }
}
