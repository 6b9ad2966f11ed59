//! tokio-http10 エラー型

use std::fmt;

/// ハンドラーが返すエラー
///
/// エンジンは HTTP ステータスに変換せず、そのまま呼び出し元に伝播する。
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// tokio-http10 エラー
#[derive(Debug)]
pub enum Error {
    /// I/O エラー (接続失敗、読み書き失敗)
    Io(std::io::Error),
    /// HTTP パースエラー (フレーミングエラー)
    Http(shiguredo_http10::Error),
    /// リクエスト検証エラー (送信前に検出)
    Encode(shiguredo_http10::EncodeError),
    /// ハンドラーエラー
    Handler(HandlerError),
    /// タイムアウト
    Timeout,
    /// キャンセルされた
    Cancelled,
    /// 接続が閉じられた
    ConnectionClosed,
    /// 不正な URL
    InvalidUrl(String),
}

impl Error {
    /// フレーミングエラーかどうか
    pub fn is_framing(&self) -> bool {
        matches!(self, Error::Http(_))
    }

    /// リクエスト検証エラーかどうか
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Encode(_))
    }

    /// タイムアウトかどうか
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Http(e) => write!(f, "HTTP error: {}", e),
            Error::Encode(e) => write!(f, "invalid request: {}", e),
            Error::Handler(e) => write!(f, "handler error: {}", e),
            Error::Timeout => write!(f, "timeout"),
            Error::Cancelled => write!(f, "cancelled"),
            Error::ConnectionClosed => write!(f, "connection closed"),
            Error::InvalidUrl(msg) => write!(f, "invalid URL: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Http(e) => Some(e),
            Error::Encode(e) => Some(e),
            Error::Handler(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<shiguredo_http10::Error> for Error {
    fn from(e: shiguredo_http10::Error) -> Self {
        Error::Http(e)
    }
}

impl From<shiguredo_http10::EncodeError> for Error {
    fn from(e: shiguredo_http10::EncodeError) -> Self {
        Error::Encode(e)
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Error::Timeout
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
