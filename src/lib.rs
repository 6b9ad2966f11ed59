//! # shiguredo_http10
//!
//! 依存なしの HTTP/1.0 スタイル リクエスト/レスポンス ワイヤー文法ライブラリ (Sans I/O)
//!
//! 1 本のバイトストリームで 1 組のリクエスト/レスポンスをやり取りするための
//! 文法 (リクエストライン、ステータスライン、ヘッダー行、Content-Length による
//! ボディ長の決定) を提供する。I/O は `tokio_http10` が担当する。
//!
//! ## 特徴
//!
//! - **依存なし**: 標準ライブラリのみ使用
//! - **Sans I/O**: I/O を完全に分離した設計
//! - **厳格なステータスライン**: 固定オフセットで検証し、寛容なパースはしない
//!
//! ## 使い方
//!
//! ### クライアント (リクエスト送信、レスポンス受信)
//!
//! ```rust
//! use shiguredo_http10::{RequestHead, parse_header_line, parse_status_line};
//!
//! let mut head = RequestHead::new("GET", "http://example.com/index.html")
//!     .header("Expect", "100-continue");
//! head.normalize_for_http10().unwrap();
//! assert_eq!(head.encode(), b"GET /index.html HTTP/1.0\r\nHost: example.com\r\n\r\n");
//!
//! let status = parse_status_line("HTTP/1.0 200 OK").unwrap();
//! assert_eq!(status.status_code, 200);
//! let (name, value) = parse_header_line("Content-Length: 5").unwrap();
//! assert_eq!((name.as_str(), value.as_str()), ("Content-Length", "5"));
//! ```
//!
//! ### サーバー (リクエスト受信、レスポンス送信)
//!
//! ```rust
//! use shiguredo_http10::{DEFAULT_AUTHORITY, RequestTarget, Response, parse_request_line};
//!
//! let line = parse_request_line("GET /hello?name=world HTTP/1.0").unwrap();
//! let target = RequestTarget::resolve(&line.target, DEFAULT_AUTHORITY).unwrap();
//! assert_eq!(target.path(), "/hello");
//!
//! let response = Response::new(200, "OK")
//!     .header("Content-Type", "text/plain")
//!     .body(b"Hello, World!".to_vec());
//! let bytes = response.encode();
//! assert!(bytes.starts_with(b"HTTP/1.0 200 OK\r\n"));
//! ```

pub mod content;
mod encoder;
mod error;
mod headers;
mod limits;
mod line;
mod request;
mod response;
pub mod target;

pub use content::{is_content_header, split_content_headers};
pub use encoder::{encode_request_head, encode_response, encode_response_head};
pub use error::{EncodeError, Error};
pub use headers::Headers;
pub use limits::DecoderLimits;
pub use line::{
    RequestLine, StatusLine, parse_header_line, parse_request_line, parse_status_line,
};
pub use request::{HTTP_10, RequestHead};
pub use response::{Response, ResponseHead, status_has_body};
pub use target::{DEFAULT_AUTHORITY, RequestTarget};
