//! tokio_http10 - Tokio integration for shiguredo_http10
//!
//! 任意の双方向バイトストリーム上で HTTP/1.0 スタイルのリクエスト/レスポンスを
//! 1 組だけやり取りする非同期クライアント/サーバーライブラリ。
//!
//! ## Features
//!
//! - `client` - クライアント機能 (デフォルト有効)
//! - `server` - サーバー機能 (デフォルト有効)
//! - `full` - すべての機能を有効化
//!
//! ## 特徴
//!
//! - **shiguredo_http10 ベース**: Sans I/O ライブラリをベースにした設計
//! - **トランスポート非依存**: [`Dialer`] / [`Listener`] で TCP、Unix ドメインソケット、メモリパイプを切り替える
//! - **行き詰まらない**: リクエストボディの送信とレスポンスの受信を並行に行う
//! - **キャンセル**: [`CancelToken`] で接続、受信、送信を打ち切る
//! - **JSON**: [`BodyView::json`] で受信したボディを nojson でパースする
//! - **ログ**: `tracing` で出力する (サブスクライバーを設定しなければ何もしない)
//!
//! ## クライアント
//!
//! ```ignore
//! use tokio_http10::Client;
//!
//! let client = Client::tcp();
//! let response = client.post("http://127.0.0.1:8080/api")
//!     .header("Content-Type", "text/plain")
//!     .body("hello")
//!     .await?;
//! println!("{} {}", response.status_code, response.body.text().await?);
//! ```
//!
//! ## サーバー
//!
//! ```ignore
//! use tokio_http10::{HandlerError, Response, Server, ServerRequest};
//!
//! async fn handler(request: ServerRequest) -> Result<Response, HandlerError> {
//!     let body = request.body.bytes().await?;
//!     Ok(Response::new(200, "OK").body(body))
//! }
//!
//! let server = Server::bind("0.0.0.0:8080").await?;
//! server.serve(handler).await?;
//! ```

pub mod body;
pub mod cancel;
#[cfg(feature = "client")]
pub mod client;
pub mod error;
pub mod line;
pub mod memory;
#[cfg(feature = "server")]
pub mod server;
pub mod transport;

pub use body::{Body, BodyReader, BodyView, JsonError};
pub use cancel::{CancelHandle, CancelToken};
#[cfg(feature = "client")]
pub use client::{Client, ClientRequest, ClientResponse, RequestBuilder, Upload};
pub use error::{Error, HandlerError, Result};
#[cfg(feature = "server")]
pub use server::{ConnectionConfig, Handler, Server, ServerRequest, serve_connection};
#[cfg(unix)]
pub use transport::{UnixDialer, UnixListener};
pub use transport::{BoxStream, Dialer, Listener, Stream, TcpDialer, TcpListener};

// shiguredo_http10 の型を re-export
pub use shiguredo_http10::{DecoderLimits, Headers, RequestHead, RequestTarget, Response};
