use crate::headers::Headers;
use crate::request::RequestHead;
use crate::response::{Response, ResponseHead, status_has_body};

fn encode_headers(buf: &mut Vec<u8>, headers: &Headers) {
    for (name, value) in headers.lines() {
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }
}

/// リクエストヘッダーをエンコード (ボディなし)
///
/// ボディは呼び出し側がストリームに直接書き込む。
pub fn encode_request_head(head: &RequestHead) -> Vec<u8> {
    let mut buf = Vec::new();

    // Request line: METHOD SP TARGET SP VERSION CRLF
    buf.extend_from_slice(head.method.as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(head.target.as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(head.version.as_bytes());
    buf.extend_from_slice(b"\r\n");

    encode_headers(&mut buf, &head.headers);

    // End of headers
    buf.extend_from_slice(b"\r\n");

    buf
}

/// レスポンスヘッダーをエンコード (ボディなし)
pub fn encode_response_head(head: &ResponseHead) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line: VERSION SP STATUS-CODE SP REASON-PHRASE CRLF
    buf.extend_from_slice(head.version.as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(format!("{:03}", head.status_code).as_bytes());
    if !head.reason_phrase.is_empty() {
        buf.push(b' ');
        buf.extend_from_slice(head.reason_phrase.as_bytes());
    }
    buf.extend_from_slice(b"\r\n");

    encode_headers(&mut buf, &head.headers);

    // End of headers
    buf.extend_from_slice(b"\r\n");

    buf
}

/// レスポンスをエンコード
///
/// 受信側がフレーミングできるように、ハンドラーが設定していなければ
/// Content-Length を付与する (ボディが空でも 0 を付与する)。
/// ただし `omit_content_length` が true の場合と、ボディを持たない
/// ステータスコード (1xx / 204 / 304) の場合は付与せず、ボディも送信しない。
pub fn encode_response(response: &Response) -> Vec<u8> {
    let mut head = response.head();
    let has_body = status_has_body(response.status_code);

    if has_body && !response.omit_content_length && !head.headers.contains("Content-Length") {
        head.headers
            .append("Content-Length", &response.body.len().to_string());
    }

    let mut buf = encode_response_head(&head);
    if has_body && !response.omit_content_length {
        buf.extend_from_slice(&response.body);
    }
    buf
}

impl RequestHead {
    /// リクエストヘッダーをバイト列にエンコード
    pub fn encode(&self) -> Vec<u8> {
        encode_request_head(self)
    }
}

impl Response {
    /// レスポンスをバイト列にエンコード
    pub fn encode(&self) -> Vec<u8> {
        encode_response(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_request_head() {
        let head = RequestHead::new("POST", "/submit")
            .header("Host", "example.com")
            .header("Accept", "text/html")
            .header("accept", "text/plain")
            .header("Content-Length", "5");
        assert_eq!(
            head.encode(),
            b"POST /submit HTTP/1.0\r\n\
              Host: example.com\r\n\
              Accept: text/html, text/plain\r\n\
              Content-Length: 5\r\n\
              \r\n"
        );
    }

    #[test]
    fn test_encode_response_adds_content_length() {
        let response = Response::new(200, "OK")
            .header("Content-Type", "text/plain")
            .body(b"hello".to_vec());
        assert_eq!(
            response.encode(),
            b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello"
        );
    }

    #[test]
    fn test_encode_response_empty_body() {
        let response = Response::new(200, "OK");
        assert_eq!(
            response.encode(),
            b"HTTP/1.0 200 OK\r\nContent-Length: 0\r\n\r\n"
        );
    }

    #[test]
    fn test_encode_response_without_reason() {
        let response = Response::new(404, "");
        assert_eq!(
            response.encode(),
            b"HTTP/1.0 404\r\nContent-Length: 0\r\n\r\n"
        );
    }

    #[test]
    fn test_encode_response_keeps_explicit_content_length() {
        let response = Response::new(200, "OK")
            .header("content-length", "3")
            .body(b"abc".to_vec());
        assert_eq!(
            response.encode(),
            b"HTTP/1.0 200 OK\r\ncontent-length: 3\r\n\r\nabc"
        );
    }

    #[test]
    fn test_encode_response_no_body_status() {
        let response = Response::new(204, "No Content").body(b"ignored".to_vec());
        assert_eq!(response.encode(), b"HTTP/1.0 204 No Content\r\n\r\n");
    }

    #[test]
    fn test_encode_response_omit_content_length() {
        let response = Response::new(200, "OK")
            .header("Content-Length", "1024")
            .omit_content_length(true);
        assert_eq!(
            response.encode(),
            b"HTTP/1.0 200 OK\r\nContent-Length: 1024\r\n\r\n"
        );
    }
}
