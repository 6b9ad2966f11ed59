//! コンテンツメタデータヘッダー
//!
//! レスポンスのヘッダーのうち、ボディ (表現) に付随するものを判定する。
//! クライアントはこれらをレスポンスヘッダーではなくボディ側に振り分ける。

use crate::headers::Headers;

/// ボディに付随するヘッダー (RFC 9110 Section 8 の表現メタデータ)
const CONTENT_HEADERS: &[&str] = &[
    "Allow",
    "Content-Disposition",
    "Content-Encoding",
    "Content-Language",
    "Content-Length",
    "Content-Location",
    "Content-MD5",
    "Content-Range",
    "Content-Type",
    "Expires",
    "Last-Modified",
];

/// コンテンツメタデータヘッダーか判定 (大文字小文字を区別しない)
pub fn is_content_header(name: &str) -> bool {
    CONTENT_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// ヘッダーを (一般ヘッダー, コンテンツヘッダー) に振り分ける
pub fn split_content_headers(headers: Headers) -> (Headers, Headers) {
    let mut general = Headers::new();
    let mut content = Headers::new();
    for (name, values) in &headers {
        let target = if is_content_header(name) {
            &mut content
        } else {
            &mut general
        };
        for value in values {
            target.append(name, value);
        }
    }
    (general, content)
}
