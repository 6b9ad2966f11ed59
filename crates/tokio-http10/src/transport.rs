//! トランスポート
//!
//! エクスチェンジエンジンは特定のトランスポートに依存しない。
//! クライアントは [`Dialer`] でストリームを取得し、サーバーは [`Listener`] で
//! 受け入れたストリームを受け取る。
//!
//! 実装:
//!
//! - [`TcpDialer`] / [`TcpListener`]: TCP ソケット
//! - [`UnixDialer`] / [`UnixListener`]: Unix ドメインソケット (Unix のみ)
//! - [`crate::memory`]: プロセス内のメモリパイプ (テスト用)

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

use shiguredo_http10::{DEFAULT_AUTHORITY, RequestHead, RequestTarget};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{Error, Result};

/// 1 回のエクスチェンジに使う双方向バイトストリーム
pub trait Stream: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> Stream for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

/// 型消去したストリーム
pub type BoxStream = Box<dyn Stream>;

/// 型消去した Future
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// クライアント側トランスポート
pub trait Dialer: Send + Sync + 'static {
    /// リクエストを送信するためのストリームを確立する
    ///
    /// `request` は正規化済みだが、呼び出し側が絶対 URI を指定した場合はターゲットが
    /// 絶対 URI のまま渡される (ワイヤー上は origin-form)。
    /// 接続に失敗した場合は `Error::Io` を返す。
    /// タイムアウトとキャンセルはクライアントが適用する。
    fn dial<'a>(&'a self, request: &'a RequestHead) -> BoxFuture<'a, Result<BoxStream>>;
}

/// サーバー側トランスポート
pub trait Listener: Send + Sync + 'static {
    /// 次のストリームを受け入れる
    fn accept(&self) -> BoxFuture<'_, Result<BoxStream>>;

    /// ローカルアドレスの表示用文字列
    fn local_addr(&self) -> Option<String> {
        None
    }
}

/// TCP で接続する Dialer
///
/// 接続先はリクエストターゲットのオーソリティ (相対ターゲットの場合は Host ヘッダー) から決める。
/// 絶対 URI の場合は Host ヘッダーより URI のオーソリティを優先する。
#[derive(Debug, Clone, Default)]
pub struct TcpDialer {
    nodelay: bool,
}

impl TcpDialer {
    /// 新しい Dialer を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// TCP_NODELAY を設定
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }
}

/// リクエストから接続先 (host:port) を決める
pub fn resolve_authority(request: &RequestHead) -> Result<(String, u16)> {
    let base = match request.headers.get("Host") {
        Some(host) if !host.is_empty() => format!("http://{}", host),
        _ => DEFAULT_AUTHORITY.to_string(),
    };
    let target = RequestTarget::resolve(&request.target, &base)
        .map_err(|e| Error::InvalidUrl(e.to_string()))?;
    if target.scheme() != "http" {
        return Err(Error::InvalidUrl(format!(
            "unsupported scheme: {}",
            target.scheme()
        )));
    }
    let host = target.host().trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(Error::InvalidUrl("URL must have a host".to_string()));
    }
    Ok((host.to_string(), target.port_or_default()))
}

impl Dialer for TcpDialer {
    fn dial<'a>(&'a self, request: &'a RequestHead) -> BoxFuture<'a, Result<BoxStream>> {
        Box::pin(async move {
            let (host, port) = resolve_authority(request)?;
            let stream = tokio::net::TcpStream::connect((host.as_str(), port)).await?;
            stream.set_nodelay(self.nodelay)?;
            Ok(Box::new(stream) as BoxStream)
        })
    }
}

/// TCP で待ち受ける Listener
#[derive(Debug)]
pub struct TcpListener {
    inner: tokio::net::TcpListener,
}

impl TcpListener {
    /// 指定アドレスにバインド
    pub async fn bind(addr: &str) -> Result<Self> {
        let inner = tokio::net::TcpListener::bind(addr).await?;
        Ok(Self { inner })
    }

    /// ローカルアドレスを取得
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.local_addr()?)
    }
}

impl From<tokio::net::TcpListener> for TcpListener {
    fn from(inner: tokio::net::TcpListener) -> Self {
        Self { inner }
    }
}

impl Listener for TcpListener {
    fn accept(&self) -> BoxFuture<'_, Result<BoxStream>> {
        Box::pin(async move {
            let (stream, peer_addr) = self.inner.accept().await?;
            tracing::debug!(%peer_addr, "accepted TCP stream");
            Ok(Box::new(stream) as BoxStream)
        })
    }

    fn local_addr(&self) -> Option<String> {
        self.inner.local_addr().ok().map(|a| a.to_string())
    }
}

/// Unix ドメインソケットで接続する Dialer
///
/// リクエストターゲットに関係なく、固定のパスに接続する。
#[cfg(unix)]
#[derive(Debug, Clone)]
pub struct UnixDialer {
    path: std::path::PathBuf,
}

#[cfg(unix)]
impl UnixDialer {
    /// 新しい Dialer を作成
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(unix)]
impl Dialer for UnixDialer {
    fn dial<'a>(&'a self, _request: &'a RequestHead) -> BoxFuture<'a, Result<BoxStream>> {
        Box::pin(async move {
            let stream = tokio::net::UnixStream::connect(&self.path).await?;
            Ok(Box::new(stream) as BoxStream)
        })
    }
}

/// Unix ドメインソケットで待ち受ける Listener
#[cfg(unix)]
#[derive(Debug)]
pub struct UnixListener {
    inner: tokio::net::UnixListener,
    path: std::path::PathBuf,
}

#[cfg(unix)]
impl UnixListener {
    /// 指定パスにバインド
    pub fn bind(path: impl Into<std::path::PathBuf>) -> Result<Self> {
        let path = path.into();
        let inner = tokio::net::UnixListener::bind(&path)?;
        Ok(Self { inner, path })
    }
}

#[cfg(unix)]
impl Listener for UnixListener {
    fn accept(&self) -> BoxFuture<'_, Result<BoxStream>> {
        Box::pin(async move {
            let (stream, _) = self.inner.accept().await?;
            Ok(Box::new(stream) as BoxStream)
        })
    }

    fn local_addr(&self) -> Option<String> {
        Some(self.path.display().to_string())
    }
}
