//! HTTP/1.0 クライアント
//!
//! 1 本のストリームで 1 組のリクエスト/レスポンスをやり取りする。
//!
//! リクエストボディの送信は別タスクで行い、呼び出し側のタスクはその完了を待たずに
//! レスポンスのステータスラインとヘッダーを読む。そのため、相手がリクエストボディを
//! 読まずにレスポンスを返してきても、有限のバッファで行き詰まることはない。
//!
//! ## 使い方
//!
//! ```ignore
//! use tokio_http10::Client;
//!
//! // GET
//! let client = Client::tcp();
//! let response = client.get("http://127.0.0.1:8080/path").await?;
//! let text = response.body.text().await?;
//!
//! // POST with body
//! let response = client.post("http://127.0.0.1:8080/api")
//!     .header("Content-Type", "application/json")
//!     .body("{\"key\": \"value\"}")
//!     .await?;
//!
//! // 既に確立したストリームを使う場合
//! let request = ClientRequest::new("GET", "/path").header("Host", "example.com");
//! let response = client.send_on_stream(request, stream, &CancelToken::never()).await?;
//! ```

use std::future::{Future, IntoFuture};
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use shiguredo_http10::{
    DecoderLimits, EncodeError, Headers, RequestHead, Response, ResponseHead, parse_status_line,
    split_content_headers, status_has_body, target::is_absolute,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, WriteHalf};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::body::{Body, BodyView};
use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::line::{read_headers, read_line};
use crate::transport::{BoxStream, Dialer, TcpDialer};

/// 送信するリクエスト
#[derive(Debug)]
pub struct ClientRequest {
    /// リクエストヘッダー
    pub head: RequestHead,
    /// リクエストボディ
    pub body: Option<Body>,
}

impl ClientRequest {
    /// 新しいリクエストを作成
    ///
    /// `target` は絶対 URI (`http://host/path`) または origin-form (`/path`)。
    pub fn new(method: &str, target: &str) -> Self {
        Self {
            head: RequestHead::new(method, target),
            body: None,
        }
    }

    /// ヘッダーを追加 (ビルダーパターン)
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.head.headers.append(name, value);
        self
    }

    /// ボディを設定 (ビルダーパターン)
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// 送信前の検証と正規化
    ///
    /// [`RequestHead::normalize_for_http10`] に加えてボディ長を確認する。
    ///
    /// - 長さが既知で Content-Length がなければ追加する
    /// - 長さが不明で Content-Length もなければエラー
    /// - Content-Length とボディの長さが異なればエラー
    ///
    /// 何度呼び出しても結果は変わらない。
    pub fn validate(&mut self) -> std::result::Result<(), EncodeError> {
        self.head.normalize_for_http10()?;

        let Some(body) = &self.body else {
            return Ok(());
        };
        let declared = self.head.headers.content_length();
        if declared.is_none() && self.head.headers.contains("Content-Length") {
            return Err(EncodeError::InvalidHeader("Content-Length".to_string()));
        }
        match (declared, body.length()) {
            (None, Some(length)) => {
                self.head
                    .headers
                    .append("Content-Length", &length.to_string());
            }
            (None, None) => return Err(EncodeError::MissingContentLength),
            (Some(declared), Some(actual)) if declared != actual => {
                return Err(EncodeError::ContentLengthMismatch { declared, actual });
            }
            _ => {}
        }
        Ok(())
    }
}

/// 受信したレスポンス
///
/// ボディはまだ読まれていない。[`BodyView`] を最後まで読むとストリームは解放される。
#[derive(Debug)]
pub struct ClientResponse {
    /// HTTP バージョン
    pub version: String,
    /// ステータスコード
    pub status_code: u16,
    /// ステータスフレーズ (空の場合あり)
    pub reason_phrase: String,
    /// レスポンスヘッダー (コンテンツメタデータを除く)
    pub headers: Headers,
    /// ボディ (コンテンツメタデータは `body.headers()`)
    pub body: BodyView,
    upload: Upload,
}

impl ClientResponse {
    /// ステータスコードが成功 (2xx) か確認
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// ヘッダーを取得 (コンテンツメタデータも含めて探す)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).or_else(|| self.body.headers().get(name))
    }

    /// リクエストボディ送信の結果を取り出す
    ///
    /// 2 回目以降は何も送信していない扱いになる。
    pub fn upload(&mut self) -> Upload {
        std::mem::take(&mut self.upload)
    }

    /// ヘッダー部分を取り出す (コンテンツメタデータも含む)
    pub fn head(&self) -> ResponseHead {
        ResponseHead {
            version: self.version.clone(),
            status_code: self.status_code,
            reason_phrase: self.reason_phrase.clone(),
            headers: merge_headers(&self.headers, self.body.headers()),
        }
    }

    /// ボディを最後まで読み取り、バッファ済みのレスポンスにする
    pub async fn into_buffered(self) -> Result<Response> {
        let head = self.head();
        let body = self.body.bytes().await?;
        Ok(Response::from_parts(head, body))
    }
}

fn merge_headers(general: &Headers, content: &Headers) -> Headers {
    let mut merged = general.clone();
    for (name, values) in content {
        for value in values {
            merged.append(name, value);
        }
    }
    merged
}

/// リクエストボディ送信タスクのハンドル
///
/// 破棄しても送信は続く。失敗はタスク側でも warn ログに出る。
#[derive(Debug, Default)]
pub struct Upload {
    handle: Option<JoinHandle<io::Result<u64>>>,
}

impl Upload {
    /// 送信タスクがあるかどうか
    pub fn is_spawned(&self) -> bool {
        self.handle.is_some()
    }

    /// 送信の完了を待ち、送信したバイト数を返す
    ///
    /// ボディがなかった場合は 0。
    pub async fn finish(self) -> Result<u64> {
        let Some(handle) = self.handle else {
            return Ok(0);
        };
        match handle.await {
            Ok(result) => Ok(result?),
            Err(e) if e.is_cancelled() => Err(Error::Cancelled),
            Err(e) => Err(Error::Io(io::Error::other(e))),
        }
    }

    fn abort(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// HTTP/1.0 クライアント
///
/// 接続は [`Dialer`] で確立する。接続の再利用はしない。
#[derive(Clone)]
pub struct Client {
    dialer: Arc<dyn Dialer>,
    connect_timeout: Duration,
    read_timeout: Duration,
    limits: DecoderLimits,
    read_buffer_size: usize,
}

impl Default for Client {
    fn default() -> Self {
        Self::tcp()
    }
}

impl Client {
    /// 指定した Dialer を使うクライアントを作成
    pub fn new(dialer: impl Dialer) -> Self {
        Self {
            dialer: Arc::new(dialer),
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            limits: DecoderLimits::default(),
            read_buffer_size: 8192,
        }
    }

    /// TCP で接続するクライアントを作成
    pub fn tcp() -> Self {
        Self::new(TcpDialer::new())
    }

    /// 接続タイムアウトを設定
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// 読み取りタイムアウトを設定 (レスポンスのステータスラインとヘッダー)
    ///
    /// リクエストヘッダーの書き込みにも同じ値を適用する。
    /// リクエストボディの送信には適用しない (キャンセルで打ち切る)。
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// デコーダーの制限を設定
    pub fn limits(mut self, limits: DecoderLimits) -> Self {
        self.limits = limits;
        self
    }

    /// 読み取りバッファサイズを設定
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// GET リクエストを作成
    pub fn get(&self, url: &str) -> RequestBuilder<'_> {
        self.request("GET", url)
    }

    /// POST リクエストを作成
    pub fn post(&self, url: &str) -> RequestBuilder<'_> {
        self.request("POST", url)
    }

    /// PUT リクエストを作成
    pub fn put(&self, url: &str) -> RequestBuilder<'_> {
        self.request("PUT", url)
    }

    /// DELETE リクエストを作成
    pub fn delete(&self, url: &str) -> RequestBuilder<'_> {
        self.request("DELETE", url)
    }

    /// HEAD リクエストを作成
    pub fn head(&self, url: &str) -> RequestBuilder<'_> {
        self.request("HEAD", url)
    }

    /// 任意のメソッドでリクエストを作成
    pub fn request(&self, method: &str, url: &str) -> RequestBuilder<'_> {
        RequestBuilder {
            client: self,
            request: ClientRequest::new(method, url),
            cancel: CancelToken::never(),
        }
    }

    /// リクエストを送信
    ///
    /// 検証してから接続する。検証エラーの場合は接続しない。
    pub async fn send(&self, request: ClientRequest) -> Result<ClientResponse> {
        self.send_with_cancel(request, CancelToken::never()).await
    }

    /// キャンセル可能なリクエスト送信
    pub async fn send_with_cancel(
        &self,
        mut request: ClientRequest,
        cancel: CancelToken,
    ) -> Result<ClientResponse> {
        let dial_head = dial_head(&mut request)?;

        let stream = guard(&cancel, self.connect_timeout, self.dialer.dial(&dial_head)).await?;
        tracing::debug!(target = %request.head.target, "connected");

        self.exchange(request, stream, &cancel).await
    }

    /// 確立済みのストリームでリクエストを送信
    ///
    /// ストリームはこのエクスチェンジ専用になる。エラーの場合は破棄される。
    pub async fn send_on_stream(
        &self,
        mut request: ClientRequest,
        stream: BoxStream,
        cancel: &CancelToken,
    ) -> Result<ClientResponse> {
        request.validate()?;
        self.exchange(request, stream, cancel).await
    }

    async fn exchange(
        &self,
        request: ClientRequest,
        stream: BoxStream,
        cancel: &CancelToken,
    ) -> Result<ClientResponse> {
        let span = tracing::debug_span!(
            "http10_exchange",
            method = %request.head.method,
            target = %request.head.target,
        );
        self.exchange_inner(request, stream, cancel)
            .instrument(span)
            .await
    }

    async fn exchange_inner(
        &self,
        request: ClientRequest,
        stream: BoxStream,
        cancel: &CancelToken,
    ) -> Result<ClientResponse> {
        let ClientRequest { head, body } = request;
        let is_head = head.is_head();
        let declared = head.headers.content_length();

        let (read_half, mut write_half) = tokio::io::split(stream);
        let head_bytes = head.encode();
        guard(cancel, self.read_timeout, async {
            write_half.write_all(&head_bytes).await?;
            write_half.flush().await?;
            Ok::<_, Error>(())
        })
        .await?;
        tracing::debug!(bytes = head_bytes.len(), "request head sent");

        let upload = match body {
            Some(body) => spawn_upload(write_half, body, declared, cancel.clone()),
            None => {
                drop(write_half);
                Upload::default()
            }
        };

        let mut reader = BufReader::with_capacity(self.read_buffer_size, read_half);
        let limits = &self.limits;
        let received = guard(cancel, self.read_timeout, async {
            let line = read_line(&mut reader, limits).await?;
            let status = parse_status_line(&line)?;
            let headers = read_headers(&mut reader, limits).await?;
            Ok::<_, Error>((status, headers))
        })
        .await;
        let (status, headers) = match received {
            Ok(received) => received,
            Err(e) => {
                upload.abort();
                tracing::debug!(error = %e, "response head failed");
                return Err(e);
            }
        };
        tracing::debug!(status_code = status.status_code, "response head received");

        let (headers, content) = split_content_headers(headers);
        let body = if is_head || !status_has_body(status.status_code) {
            drop(reader);
            BodyView::empty()
        } else {
            BodyView::new(Box::new(reader), content.content_length(), true)
        };

        Ok(ClientResponse {
            version: status.version,
            status_code: status.status_code,
            reason_phrase: status.reason_phrase,
            headers,
            body: body.with_headers(content),
            upload,
        })
    }
}

/// 検証して、Dialer に渡すヘッダーを作る
///
/// 正規化でターゲットは origin-form になるが、Dialer には絶対 URI のまま渡して
/// Host ヘッダーではなく URI のオーソリティに接続させる。
fn dial_head(request: &mut ClientRequest) -> std::result::Result<RequestHead, EncodeError> {
    let target = request.head.target.clone();
    request.validate()?;
    let mut head = request.head.clone();
    if is_absolute(&target) {
        head.target = target;
    }
    Ok(head)
}

/// タイムアウトとキャンセルを適用する
async fn guard<T, F>(cancel: &CancelToken, timeout: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = tokio::time::timeout(timeout, future) => result?,
    }
}

fn spawn_upload(
    writer: WriteHalf<BoxStream>,
    body: Body,
    declared: Option<u64>,
    cancel: CancelToken,
) -> Upload {
    let task = async move {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(io::Error::new(io::ErrorKind::Interrupted, "upload cancelled")),
            result = upload_body(writer, body, declared) => result,
        };
        match &result {
            Ok(bytes) => tracing::debug!(bytes, "request body sent"),
            Err(e) => tracing::warn!(error = %e, "request body upload failed"),
        }
        result
    };
    Upload {
        handle: Some(tokio::spawn(task.in_current_span())),
    }
}

async fn upload_body(
    mut writer: WriteHalf<BoxStream>,
    body: Body,
    declared: Option<u64>,
) -> io::Result<u64> {
    let limit = declared.or(body.length()).unwrap_or(u64::MAX);
    let mut reader = body.into_reader().take(limit);
    let sent = tokio::io::copy(&mut reader, &mut writer).await?;
    writer.flush().await?;
    if limit != u64::MAX && sent < limit {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("request body ended after {sent} of {limit} bytes"),
        ));
    }
    Ok(sent)
}

/// リクエストビルダー
///
/// Client のメソッド (get, post など) から取得し、ヘッダーやボディを追加してから
/// `.await` でリクエストを送信する。
pub struct RequestBuilder<'a> {
    client: &'a Client,
    request: ClientRequest,
    cancel: CancelToken,
}

impl<'a> RequestBuilder<'a> {
    /// ヘッダーを追加
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    /// ボディを設定
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.request = self.request.body(body);
        self
    }

    /// キャンセルトークンを設定
    pub fn cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl<'a> IntoFuture for RequestBuilder<'a> {
    type Output = Result<ClientResponse>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.client.send_with_cancel(self.request, self.cancel))
    }
}
