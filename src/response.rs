use crate::headers::Headers;
use crate::request::HTTP_10;

/// HTTP レスポンスヘッダー (ボディなし)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    /// HTTP バージョン (HTTP/1.0 等)
    pub version: String,
    /// ステータスコード (200, 404, etc.)
    pub status_code: u16,
    /// ステータスフレーズ (空の場合あり)
    pub reason_phrase: String,
    /// ヘッダー
    pub headers: Headers,
}

impl ResponseHead {
    /// ステータスコードが成功 (2xx) か確認
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// ステータスコードがクライアントエラー (4xx) か確認
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    /// ステータスコードがサーバーエラー (5xx) か確認
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }
}

/// ステータスコードからボディを持ちうるか判定
///
/// 1xx, 204, 304 はボディなし (RFC 9110 Section 6.4.1)
pub fn status_has_body(status_code: u16) -> bool {
    !((100..200).contains(&status_code) || status_code == 204 || status_code == 304)
}

/// HTTP レスポンス (ボディはバッファ済み)
///
/// サーバー側のハンドラーが組み立てて返す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP バージョン
    ///
    /// サーバーはエンコード時にリクエストのバージョンで上書きする。
    pub version: String,
    /// ステータスコード (200, 404, etc.)
    pub status_code: u16,
    /// ステータスフレーズ (OK, Not Found, etc.)
    pub reason_phrase: String,
    /// ヘッダー
    pub headers: Headers,
    /// ボディ
    pub body: Vec<u8>,
    /// Content-Length 自動付与を抑止するフラグ (HEAD レスポンス用)
    pub omit_content_length: bool,
}

impl Response {
    /// 新しいレスポンスを作成 (HTTP/1.0)
    pub fn new(status_code: u16, reason_phrase: &str) -> Self {
        Self {
            version: HTTP_10.to_string(),
            status_code,
            reason_phrase: reason_phrase.to_string(),
            headers: Headers::new(),
            body: Vec::new(),
            omit_content_length: false,
        }
    }

    /// Content-Length 自動付与を抑止する (ビルダーパターン)
    pub fn omit_content_length(mut self, omit: bool) -> Self {
        self.omit_content_length = omit;
        self
    }

    /// ヘッダーを追加 (ビルダーパターン)
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }

    /// ボディを設定 (ビルダーパターン)
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// ヘッダーを追加
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.append(name, value);
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// ヘッダーが存在するか確認
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    /// ステータスコードが成功 (2xx) か確認
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Content-Length ヘッダーの値を取得
    pub fn content_length(&self) -> Option<u64> {
        self.headers.content_length()
    }

    /// ヘッダー部分を取り出す
    pub fn head(&self) -> ResponseHead {
        ResponseHead {
            version: self.version.clone(),
            status_code: self.status_code,
            reason_phrase: self.reason_phrase.clone(),
            headers: self.headers.clone(),
        }
    }

    /// ヘッダーとボディから組み立てる
    pub fn from_parts(head: ResponseHead, body: Vec<u8>) -> Self {
        Self {
            version: head.version,
            status_code: head.status_code,
            reason_phrase: head.reason_phrase,
            headers: head.headers,
            body,
            omit_content_length: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_builder() {
        let response = Response::new(201, "Created")
            .header("Location", "/items/1")
            .body("ok");
        assert_eq!(response.version, "HTTP/1.0");
        assert_eq!(response.status_code, 201);
        assert!(response.is_success());
        assert_eq!(response.get_header("location"), Some("/items/1"));
        assert_eq!(response.body, b"ok");
        assert!(!response.omit_content_length);
    }

    #[test]
    fn test_status_has_body() {
        assert!(status_has_body(200));
        assert!(status_has_body(404));
        assert!(!status_has_body(100));
        assert!(!status_has_body(204));
        assert!(!status_has_body(304));
    }

    #[test]
    fn test_head_and_from_parts() {
        let response = Response::new(404, "").header("X-A", "1").body(vec![1, 2, 3]);
        let head = response.head();
        assert!(head.is_client_error());
        let rebuilt = Response::from_parts(head, response.body.clone());
        assert_eq!(rebuilt, response);
    }
}
