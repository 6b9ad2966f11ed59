use std::fmt;

/// HTTP パースエラー (フレーミングエラー)
///
/// このエラーが発生したエクスチェンジは回復できない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// 不正なリクエストライン
    InvalidRequestLine(String),
    /// 不正なステータスライン
    InvalidStatusLine(String),
    /// 不正なヘッダー行
    InvalidHeaderLine(String),
    /// 不正なリクエストターゲット
    InvalidTarget(String),
    /// 不正なデータ
    InvalidData(String),
    /// ヘッダー数超過
    TooManyHeaders { count: usize, limit: usize },
    /// 行が長すぎる
    HeaderLineTooLong { size: usize, limit: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRequestLine(line) => write!(f, "invalid request line: {:?}", line),
            Error::InvalidStatusLine(line) => write!(f, "invalid status line: {:?}", line),
            Error::InvalidHeaderLine(msg) => write!(f, "invalid header line: {}", msg),
            Error::InvalidTarget(msg) => write!(f, "invalid request target: {}", msg),
            Error::InvalidData(msg) => write!(f, "invalid data: {}", msg),
            Error::TooManyHeaders { count, limit } => {
                write!(f, "too many headers: {} > {}", count, limit)
            }
            Error::HeaderLineTooLong { size, limit } => {
                write!(f, "header line too long: {} > {}", size, limit)
            }
        }
    }
}

impl std::error::Error for Error {}

/// リクエスト検証エラー
///
/// バイトを送信する前 (接続を確立する前) に検出される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Transfer-Encoding: chunked が指定されている
    ///
    /// HTTP/1.0 では chunked ボディをフレーミングできない。
    ChunkedTransferEncoding,
    /// 長さが不明なボディに Content-Length がない
    MissingContentLength,
    /// Content-Length とボディの長さが一致しない
    ContentLengthMismatch { declared: u64, actual: u64 },
    /// ヘッダー名または値に CR / LF / NUL が含まれている
    InvalidHeader(String),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::ChunkedTransferEncoding => {
                write!(f, "chunked Transfer-Encoding cannot be framed over HTTP/1.0")
            }
            EncodeError::MissingContentLength => {
                write!(f, "body of unknown length requires a Content-Length header")
            }
            EncodeError::ContentLengthMismatch { declared, actual } => {
                write!(
                    f,
                    "Content-Length mismatch: declared {} but body has {} bytes",
                    declared, actual
                )
            }
            EncodeError::InvalidHeader(name) => write!(f, "invalid header: {:?}", name),
        }
    }
}

impl std::error::Error for EncodeError {}
