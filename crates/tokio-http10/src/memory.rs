//! メモリトランスポート
//!
//! `tokio::io::duplex` を使ったプロセス内トランスポート。
//! 内部バッファは有限なので、相手が読まなければ書き込みは止まる。
//! ネットワークなしでエクスチェンジエンジンをテストするために使う。
//!
//! ```ignore
//! let (dialer, listener) = tokio_http10::memory::pair(64 * 1024);
//! let server = Server::new(listener);
//! let client = Client::new(dialer);
//! ```

use shiguredo_http10::RequestHead;
use tokio::io::DuplexStream;
use tokio::sync::{Mutex, mpsc};

use crate::error::{Error, Result};
use crate::transport::{BoxFuture, BoxStream, Dialer, Listener};

/// 接続された Dialer と Listener を作成
///
/// `buffer_size` は各方向の内部バッファの最大バイト数。
pub fn pair(buffer_size: usize) -> (MemoryDialer, MemoryListener) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        MemoryDialer { tx, buffer_size },
        MemoryListener { rx: Mutex::new(rx) },
    )
}

/// メモリトランスポートの Dialer
#[derive(Debug, Clone)]
pub struct MemoryDialer {
    tx: mpsc::UnboundedSender<DuplexStream>,
    buffer_size: usize,
}

impl MemoryDialer {
    /// 内部バッファサイズ
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

impl Dialer for MemoryDialer {
    fn dial<'a>(&'a self, _request: &'a RequestHead) -> BoxFuture<'a, Result<BoxStream>> {
        Box::pin(async move {
            let (local, remote) = tokio::io::duplex(self.buffer_size);
            self.tx.send(remote).map_err(|_| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "memory listener closed",
                ))
            })?;
            Ok(Box::new(local) as BoxStream)
        })
    }
}

/// メモリトランスポートの Listener
#[derive(Debug)]
pub struct MemoryListener {
    rx: Mutex<mpsc::UnboundedReceiver<DuplexStream>>,
}

impl Listener for MemoryListener {
    fn accept(&self) -> BoxFuture<'_, Result<BoxStream>> {
        Box::pin(async move {
            let mut rx = self.rx.lock().await;
            match rx.recv().await {
                Some(stream) => Ok(Box::new(stream) as BoxStream),
                // すべての Dialer が破棄された
                None => Err(Error::ConnectionClosed),
            }
        })
    }

    fn local_addr(&self) -> Option<String> {
        Some("memory".to_string())
    }
}
