//! HTTP/1.0 サーバー
//!
//! 受け入れた 1 本のストリームで 1 組のリクエスト/レスポンスを処理し、
//! レスポンスを書き終えたら書き込み側を閉じる。
//!
//! ## 使い方
//!
//! ```ignore
//! use tokio_http10::{Response, Server, ServerRequest};
//! use tokio_http10::error::HandlerError;
//!
//! async fn handler(request: ServerRequest) -> Result<Response, HandlerError> {
//!     Ok(Response::new(200, "OK")
//!         .header("Content-Type", "text/plain")
//!         .body("Hello, World!"))
//! }
//!
//! let server = Server::bind("0.0.0.0:8080").await?;
//! server.serve(handler).await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use shiguredo_http10::{
    DEFAULT_AUTHORITY, DecoderLimits, Headers, RequestTarget, Response, encode_response,
    parse_request_line, split_content_headers, status_has_body,
};
use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
use tracing::Instrument;

use crate::body::BodyView;
use crate::cancel::CancelToken;
use crate::error::{Error, HandlerError, Result};
use crate::line::{read_headers, read_line};
use crate::transport::{BoxStream, Listener, TcpListener};

/// 受信したリクエスト
#[derive(Debug)]
pub struct ServerRequest {
    /// HTTP メソッド
    pub method: String,
    /// 解決済みのリクエストターゲット
    pub target: RequestTarget,
    /// リクエストラインに書かれていたターゲット
    pub raw_target: String,
    /// HTTP バージョン (リクエストラインのまま)
    pub version: String,
    /// ヘッダー
    pub headers: Headers,
    /// ボディ
    ///
    /// Content-Length がなければ空。
    pub body: BodyView,
}

impl ServerRequest {
    /// パス
    pub fn path(&self) -> &str {
        self.target.path()
    }

    /// クエリ文字列
    pub fn query(&self) -> Option<&str> {
        self.target.query()
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// HEAD リクエストか判定
    pub fn is_head(&self) -> bool {
        self.method.eq_ignore_ascii_case("HEAD")
    }
}

/// HTTP リクエストハンドラー
///
/// エラーを返した場合、レスポンスは書き込まれずにエラーが呼び出し元へ伝播する。
pub trait Handler: Send + Sync + 'static {
    /// リクエストを処理してレスポンスを返す
    fn handle(
        &self,
        request: ServerRequest,
    ) -> impl Future<Output = std::result::Result<Response, HandlerError>> + Send;
}

/// 関数からハンドラーを作成
impl<F, Fut> Handler for F
where
    F: Fn(ServerRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Response, HandlerError>> + Send,
{
    fn handle(
        &self,
        request: ServerRequest,
    ) -> impl Future<Output = std::result::Result<Response, HandlerError>> + Send {
        (self)(request)
    }
}

/// 1 接続の処理設定
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// リクエストラインとヘッダーの読み取りタイムアウト
    pub read_timeout: Duration,
    /// 読み取りバッファサイズ
    pub read_buffer_size: usize,
    /// 書き込みバッファサイズ
    pub write_buffer_size: usize,
    /// デコーダーの制限
    pub limits: DecoderLimits,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(60),
            read_buffer_size: 8192,
            write_buffer_size: 65536,
            limits: DecoderLimits::default(),
        }
    }
}

/// 1 本のストリームでリクエストを受け取りレスポンスを返す
///
/// リクエストラインやヘッダーが不正な場合はエラーレスポンスを返さずにエラーを返す。
pub async fn serve_connection<H: Handler>(
    stream: BoxStream,
    handler: &H,
    config: &ConnectionConfig,
) -> Result<()> {
    let (read_half, write_half) = tokio::io::split(stream);
    let mut reader = BufReader::with_capacity(config.read_buffer_size, read_half);

    let limits = &config.limits;
    let (line, headers) = tokio::time::timeout(config.read_timeout, async {
        let line = read_line(&mut reader, limits).await?;
        let line = parse_request_line(&line)?;
        let headers = read_headers(&mut reader, limits).await?;
        Ok::<_, Error>((line, headers))
    })
    .await??;
    let target = RequestTarget::resolve(&line.target, DEFAULT_AUTHORITY)?;
    tracing::debug!(method = %line.method, target = %line.target, "request head received");

    // Content-Length がなければボディはない (クライアントは書き込み側を開いたままにする)
    let body = match headers.content_length() {
        Some(length) => {
            let (_, content) = split_content_headers(headers.clone());
            BodyView::new(Box::new(reader), Some(length), false).with_headers(content)
        }
        None => BodyView::empty(),
    };

    let request = ServerRequest {
        method: line.method,
        target,
        raw_target: line.target,
        version: line.version.clone(),
        headers,
        body,
    };
    let is_head = request.is_head();

    let mut response = handler.handle(request).await.map_err(Error::Handler)?;
    response.version = line.version;
    if is_head {
        strip_head_body(&mut response);
    }

    let bytes = encode_response(&response);
    let mut writer = BufWriter::with_capacity(config.write_buffer_size, write_half);
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    writer.shutdown().await?;
    tracing::debug!(
        status_code = response.status_code,
        bytes = bytes.len(),
        "response sent"
    );

    Ok(())
}

/// HEAD へのレスポンスからボディを取り除く
///
/// Content-Length はボディがあった場合の長さを示す。
fn strip_head_body(response: &mut Response) {
    if !response.omit_content_length
        && !response.has_header("Content-Length")
        && status_has_body(response.status_code)
    {
        let length = response.body.len().to_string();
        response.add_header("Content-Length", &length);
    }
    response.body.clear();
    response.omit_content_length = true;
}

/// HTTP/1.0 サーバー
///
/// 受け入れたストリームごとにタスクを起動して処理する。
pub struct Server {
    listener: Box<dyn Listener>,
    config: ConnectionConfig,
}

impl Server {
    /// 指定した Listener で待ち受けるサーバーを作成
    pub fn new(listener: impl Listener) -> Self {
        Self {
            listener: Box::new(listener),
            config: ConnectionConfig::default(),
        }
    }

    /// 指定アドレスに TCP でバインド
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self::new(listener))
    }

    /// 読み取りタイムアウトを設定
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// 読み取りバッファサイズを設定
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// 書き込みバッファサイズを設定
    pub fn write_buffer_size(mut self, size: usize) -> Self {
        self.config.write_buffer_size = size;
        self
    }

    /// デコーダーの制限を設定
    pub fn limits(mut self, limits: DecoderLimits) -> Self {
        self.config.limits = limits;
        self
    }

    /// 接続の処理設定
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// ローカルアドレスの表示用文字列
    pub fn local_addr(&self) -> Option<String> {
        self.listener.local_addr()
    }

    /// サーバーを起動
    ///
    /// Listener がエラーを返すまで戻らない。
    pub async fn serve<H: Handler>(self, handler: H) -> Result<()> {
        self.serve_until(handler, CancelToken::never()).await
    }

    /// キャンセルされるまでサーバーを起動
    ///
    /// キャンセル後は新しいストリームを受け入れない。処理中の接続はそのまま続く。
    pub async fn serve_until<H: Handler>(self, handler: H, cancel: CancelToken) -> Result<()> {
        let config = Arc::new(self.config);
        let handler = Arc::new(handler);
        tracing::info!(local_addr = ?self.listener.local_addr(), "server started");

        loop {
            let stream = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("server stopped");
                    return Ok(());
                }
                stream = self.listener.accept() => stream?,
            };
            let config = config.clone();
            let handler = handler.clone();

            let span = tracing::debug_span!("http10_connection");
            tokio::spawn(
                async move {
                    if let Err(e) = serve_connection(stream, handler.as_ref(), &config).await {
                        tracing::warn!(error = %e, "connection error");
                    }
                }
                .instrument(span),
            );
        }
    }

    /// 単一のストリームを処理
    pub async fn handle_one<H: Handler>(self, handler: H) -> Result<()> {
        let stream = self.listener.accept().await?;
        serve_connection(stream, &handler, &self.config).await
    }
}
