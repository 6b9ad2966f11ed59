//! ワイヤー文法を組み合わせたテスト
//!
//! エンコーダーの出力を行単位に分け、パーサーで読み戻せることを確認する。
//! I/O を伴う読み取りは tokio_http10 側でテストする。

use shiguredo_http10::{
    DEFAULT_AUTHORITY, EncodeError, Error, Headers, RequestHead, RequestTarget, Response,
    parse_header_line, parse_request_line, parse_status_line, split_content_headers,
};

/// スタートライン、ヘッダー、残りのバイト列に分ける
fn split_message(bytes: &[u8]) -> (String, Headers, &[u8]) {
    let mut rest = bytes;
    let mut next_line = || {
        let pos = rest
            .windows(2)
            .position(|w| w == b"\r\n")
            .expect("line terminator");
        let line = std::str::from_utf8(&rest[..pos]).unwrap().to_string();
        rest = &rest[pos + 2..];
        line
    };

    let start = next_line();
    let mut headers = Headers::new();
    loop {
        let line = next_line();
        // 空行でヘッダーは終わる
        if line.is_empty() {
            break;
        }
        let (name, value) = parse_header_line(&line).unwrap();
        headers.append(&name, &value);
    }
    (start, headers, rest)
}

#[test]
fn response_round_trip_with_content_length() {
    let response = Response::new(200, "OK")
        .header("Content-Type", "text/plain")
        .header("Set-Cookie", "a=1")
        .header("Set-Cookie", "b=2")
        .body("hello, world");
    let bytes = response.encode();

    let (start, headers, rest) = split_message(&bytes);
    let status = parse_status_line(&start).unwrap();
    assert_eq!(status.version, "HTTP/1.0");
    assert_eq!(status.status_code, 200);
    assert_eq!(status.reason_phrase, "OK");

    assert_eq!(headers.get_all("set-cookie"), ["a=1", "b=2"]);
    let length = headers.content_length().unwrap() as usize;
    assert_eq!(&rest[..length], b"hello, world");
    assert_eq!(rest.len(), length);

    let (general, content) = split_content_headers(headers);
    assert!(general.contains("Set-Cookie"));
    assert_eq!(content.get("Content-Type"), Some("text/plain"));
    assert_eq!(content.get("Content-Length"), Some("12"));
}

#[test]
fn empty_line_terminates_headers() {
    let bytes = b"HTTP/1.0 200 OK\r\nA: 1\r\n\r\nB: 2\r\n\r\n";
    let (_, headers, rest) = split_message(bytes);
    assert_eq!(headers.len(), 1);
    assert_eq!(headers.get("A"), Some("1"));
    assert!(!headers.contains("B"));
    assert_eq!(rest, b"B: 2\r\n\r\n");
}

#[test]
fn request_head_round_trip() {
    let mut head = RequestHead::new("PUT", "http://example.com:8080/items/1?force=true")
        .header("Accept", "text/plain, application/json")
        .header("accept", "text/html");
    head.normalize_for_http10().unwrap();
    let bytes = head.encode();

    let (start, headers, rest) = split_message(&bytes);
    assert!(rest.is_empty());

    let line = parse_request_line(&start).unwrap();
    assert_eq!(line.method, "PUT");
    assert_eq!(line.target, "/items/1?force=true");
    assert_eq!(line.version, "HTTP/1.0");

    // 結合された 1 行はカンマで分割されず 1 つの値になる
    assert_eq!(
        headers.get_all("Accept"),
        ["text/plain, application/json, text/html"]
    );
    assert_eq!(headers.get("Host"), Some("example.com:8080"));

    let target = RequestTarget::resolve(&line.target, DEFAULT_AUTHORITY).unwrap();
    assert_eq!(target.path(), "/items/1");
    assert_eq!(target.query(), Some("force=true"));
}

#[test]
fn status_line_cases() {
    let status = parse_status_line("HTTP/1.1 200 OK").unwrap();
    assert_eq!(
        (status.version.as_str(), status.status_code, status.reason_phrase.as_str()),
        ("HTTP/1.1", 200, "OK")
    );

    let status = parse_status_line("HTTP/1.0 404").unwrap();
    assert_eq!(status.status_code, 404);
    assert_eq!(status.reason_phrase, "");

    for line in ["HTTP/1.1 2000 X", "HTTP/1.0 20", "HTTP/1.0", "", "HTTP/1.1  200 OK"] {
        assert!(
            matches!(parse_status_line(line), Err(Error::InvalidStatusLine(_))),
            "{line:?}"
        );
    }
}

#[test]
fn request_line_cases() {
    let line = parse_request_line("GET /foo HTTP/1.1").unwrap();
    assert_eq!(line.method, "GET");
    assert_eq!(line.target, "/foo");
    assert_eq!(line.version, "HTTP/1.1");

    for line in ["GET /foo", "GET /foo HTTP/1.1 extra", "GET  /foo HTTP/1.1", ""] {
        assert!(
            matches!(parse_request_line(line), Err(Error::InvalidRequestLine(_))),
            "{line:?}"
        );
    }
}

#[test]
fn chunked_request_cannot_be_normalized() {
    let mut head = RequestHead::new("POST", "/upload")
        .header("Transfer-Encoding", "gzip, chunked")
        .header("Content-Length", "10");
    assert_eq!(
        head.normalize_for_http10(),
        Err(EncodeError::ChunkedTransferEncoding)
    );
}

#[test]
fn response_without_body_status() {
    for (code, reason) in [(204, "No Content"), (304, "Not Modified")] {
        let bytes = Response::new(code, reason).body("ignored").encode();
        let (start, headers, rest) = split_message(&bytes);
        assert_eq!(parse_status_line(&start).unwrap().status_code, code);
        assert!(!headers.contains("Content-Length"));
        assert!(rest.is_empty());
    }

    let bytes = Response::new(200, "OK").encode();
    let (_, headers, rest) = split_message(&bytes);
    assert_eq!(headers.content_length(), Some(0));
    assert!(rest.is_empty());
}
