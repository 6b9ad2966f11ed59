//! ボディ
//!
//! - [`Body`]: 送信するリクエストボディ
//! - [`BodyView`]: 受信したボディを読み取る前方専用のビュー
//! - [`JsonError`]: [`BodyView::json`] のエラー

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use shiguredo_http10::Headers;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncReadExt, ReadBuf, Take};

use crate::error::{Error, Result};

/// ボディを読み取るリーダー (ストリームの読み取り側)
pub type BodyReader = Box<dyn AsyncBufRead + Send + Unpin>;

/// 送信するリクエストボディ
pub struct Body {
    reader: Box<dyn AsyncRead + Send + Unpin>,
    length: Option<u64>,
}

impl Body {
    /// バイト列からボディを作成 (長さは既知)
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let length = bytes.len() as u64;
        Self {
            reader: Box::new(io::Cursor::new(bytes)),
            length: Some(length),
        }
    }

    /// 任意のリーダーからボディを作成
    ///
    /// `length` が `None` の場合、リクエストに Content-Length ヘッダーが必要。
    pub fn from_reader<R>(reader: R, length: Option<u64>) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            reader: Box::new(reader),
            length,
        }
    }

    /// 既知の長さ
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    pub(crate) fn into_reader(self) -> Box<dyn AsyncRead + Send + Unpin> {
        self.reader
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&'static [u8]> for Body {
    fn from(bytes: &'static [u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::from_bytes(text)
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::from_bytes(text)
    }
}

/// 受信したボディのビュー
///
/// 宣言された長さ (Content-Length) があればそれを超えて読まない。
/// 長さがなければストリームの終端まで読む。
///
/// `close_on_end` が有効な場合、終端に達した時点でリーダーを破棄し、
/// ストリームを解放する。途中までしか読まない場合は [`BodyView::close`]
/// するか破棄すること。
pub struct BodyView {
    reader: Option<Take<BodyReader>>,
    declared: Option<u64>,
    consumed: u64,
    finished: bool,
    close_on_end: bool,
    headers: Headers,
}

impl BodyView {
    /// 新しいビューを作成
    pub fn new(reader: BodyReader, declared: Option<u64>, close_on_end: bool) -> Self {
        let mut view = Self {
            reader: Some(reader.take(declared.unwrap_or(u64::MAX))),
            declared,
            consumed: 0,
            finished: false,
            close_on_end,
            headers: Headers::new(),
        };
        if declared == Some(0) {
            view.finish();
        }
        view
    }

    /// 空のビューを作成
    pub fn empty() -> Self {
        Self {
            reader: None,
            declared: Some(0),
            consumed: 0,
            finished: true,
            close_on_end: true,
            headers: Headers::new(),
        }
    }

    /// コンテンツメタデータヘッダーを設定 (ビルダーパターン)
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// コンテンツメタデータヘッダー (Content-Type, Content-Length 等)
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// 宣言された長さ
    pub fn content_length(&self) -> Option<u64> {
        self.declared
    }

    /// これまでに読み取ったバイト数
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// 終端に達したかどうか
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// ストリームを解放済みかどうか
    pub fn is_released(&self) -> bool {
        self.reader.is_none()
    }

    /// リーダーを取り出す
    ///
    /// 解放済みの場合は `None`。
    pub fn into_inner(mut self) -> Option<BodyReader> {
        self.reader.take().map(Take::into_inner)
    }

    /// 読み取りを打ち切ってストリームを解放する
    pub fn close(mut self) {
        self.reader = None;
    }

    /// 残りをすべて読み取る
    pub async fn bytes(mut self) -> Result<Vec<u8>> {
        let capacity = self.declared.unwrap_or(0).min(64 * 1024) as usize;
        let mut buf = Vec::with_capacity(capacity);
        self.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// 残りをすべて読み取り UTF-8 文字列として返す
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes)
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    /// 残りをすべて読み取り JSON としてパースする
    pub async fn json<T>(self) -> std::result::Result<T, JsonError>
    where
        for<'text, 'raw> T:
            TryFrom<nojson::RawJsonValue<'text, 'raw>, Error = nojson::JsonParseError>,
    {
        let bytes = self.bytes().await.map_err(JsonError::Read)?;
        let text = String::from_utf8(bytes).map_err(JsonError::Utf8)?;
        let raw = nojson::RawJson::parse(&text).map_err(JsonError::Parse)?;
        let value: T = raw.value().try_into().map_err(JsonError::Parse)?;
        Ok(value)
    }

    fn finish(&mut self) {
        self.finished = true;
        if self.close_on_end {
            self.reader = None;
        }
    }
}

impl AsyncRead for BodyView {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.finished || buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }
        let Some(reader) = this.reader.as_mut() else {
            return Poll::Ready(Ok(()));
        };

        let before = buf.filled().len();
        ready!(Pin::new(&mut *reader).poll_read(cx, buf))?;
        let n = (buf.filled().len() - before) as u64;
        let remaining = reader.limit();
        this.consumed += n;

        match this.declared {
            Some(declared) if n == 0 && remaining > 0 => {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "body ended after {} of {} declared bytes",
                        this.consumed, declared
                    ),
                )));
            }
            Some(_) if remaining == 0 => this.finish(),
            None if n == 0 => this.finish(),
            _ => {}
        }

        Poll::Ready(Ok(()))
    }
}

/// ボディを JSON として読み取る際のエラー
#[derive(Debug)]
pub enum JsonError {
    /// ボディの読み取りエラー
    Read(Error),
    /// UTF-8 デコードエラー
    Utf8(std::string::FromUtf8Error),
    /// JSON パースエラー
    Parse(nojson::JsonParseError),
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonError::Read(e) => write!(f, "body read error: {}", e),
            JsonError::Utf8(e) => write!(f, "UTF-8 decode error: {}", e),
            JsonError::Parse(e) => write!(f, "JSON parse error: {}", e),
        }
    }
}

impl std::error::Error for JsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JsonError::Read(e) => Some(e),
            JsonError::Utf8(e) => Some(e),
            JsonError::Parse(e) => Some(e),
        }
    }
}

impl fmt::Debug for BodyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyView")
            .field("declared", &self.declared)
            .field("consumed", &self.consumed)
            .field("finished", &self.finished)
            .field("released", &self.reader.is_none())
            .field("headers", &self.headers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncWriteExt, BufReader};

    use super::*;
    use crate::transport::BoxStream;

    fn reader(data: &'static [u8]) -> BodyReader {
        Box::new(BufReader::new(data))
    }

    #[tokio::test]
    async fn test_bounded_stops_at_declared_length() {
        let mut view = BodyView::new(reader(b"hello, trailing"), Some(5), false);
        let mut buf = Vec::new();
        view.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"hello");
        assert!(view.is_finished());
        assert!(!view.is_released());

        let mut rest = Vec::new();
        view.into_inner()
            .unwrap()
            .read_to_end(&mut rest)
            .await
            .unwrap();
        assert_eq!(rest, b", trailing");
    }

    #[tokio::test]
    async fn test_unbounded_reads_to_eof() {
        let view = BodyView::new(reader(b"all of it"), None, true);
        assert_eq!(view.text().await.unwrap(), "all of it");
    }

    #[tokio::test]
    async fn test_unbounded_empty_ends_on_first_read() {
        let mut view = BodyView::new(reader(b""), None, true);
        let mut buf = [0u8; 16];
        assert_eq!(view.read(&mut buf).await.unwrap(), 0);
        assert!(view.is_finished());
        assert!(view.is_released());
    }

    #[tokio::test]
    async fn test_declared_zero() {
        let mut view = BodyView::new(reader(b"next"), Some(0), true);
        assert!(view.is_finished());
        assert!(view.is_released());
        let mut buf = [0u8; 4];
        assert_eq!(view.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_premature_eof() {
        let view = BodyView::new(reader(b"abc"), Some(10), true);
        let err = view.bytes().await.unwrap_err();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_releases_stream_when_consumed() {
        let (local, mut remote) = tokio::io::duplex(64);
        let (read_half, write_half) = tokio::io::split(Box::new(local) as BoxStream);
        drop(write_half);

        remote.write_all(b"12345").await.unwrap();
        let mut view = BodyView::new(Box::new(BufReader::new(read_half)), Some(5), true);
        let mut buf = Vec::new();
        view.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"12345");
        assert!(view.is_released());

        // 読み取り側が解放されたので相手の書き込みは失敗する
        let err = remote.write_all(b"more").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn test_empty() {
        let view = BodyView::empty();
        assert!(view.is_finished());
        assert_eq!(view.content_length(), Some(0));
        assert!(view.bytes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json() {
        let view = BodyView::new(reader(b"[1, 2, 3]trailing"), Some(9), true);
        let values: Vec<u32> = view.json().await.unwrap();
        assert_eq!(values, [1, 2, 3]);

        let view = BodyView::new(reader(b"\"ok\""), None, true);
        let value: String = view.json().await.unwrap();
        assert_eq!(value, "ok");
    }

    #[tokio::test]
    async fn test_json_errors() {
        let view = BodyView::new(reader(b"not json"), None, true);
        assert!(matches!(
            view.json::<Vec<u32>>().await,
            Err(JsonError::Parse(_))
        ));

        let view = BodyView::new(reader(b"\xff"), None, true);
        assert!(matches!(
            view.json::<Vec<u32>>().await,
            Err(JsonError::Utf8(_))
        ));

        let view = BodyView::new(reader(b"[1"), Some(10), true);
        assert!(matches!(
            view.json::<Vec<u32>>().await,
            Err(JsonError::Read(Error::Io(_)))
        ));
    }

    #[tokio::test]
    async fn test_body_from_bytes() {
        let body = Body::from("payload");
        assert_eq!(body.length(), Some(7));
        let mut buf = Vec::new();
        body.into_reader().read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"payload");
    }
}
