//! エンコーダーと正規化のプロパティテスト

use pbt::{absolute_path, header_value, hostname, query};
use proptest::prelude::*;
use shiguredo_http10::{RequestHead, Response, parse_request_line, parse_status_line};

fn split_head(bytes: &[u8]) -> (Vec<String>, &[u8]) {
    let end = bytes
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("end of headers");
    let head = std::str::from_utf8(&bytes[..end]).unwrap();
    let lines = head.split("\r\n").map(str::to_string).collect();
    (lines, &bytes[end + 4..])
}

proptest! {
    #[test]
    fn prop_response_content_length_matches_body(
        code in 200u16..=599,
        body in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        prop_assume!(code != 204 && code != 304);
        let bytes = Response::new(code, "Reason").body(body.clone()).encode();
        let (lines, rest) = split_head(&bytes);

        let status = parse_status_line(&lines[0]).unwrap();
        prop_assert_eq!(status.status_code, code);
        let expected = format!("Content-Length: {}", body.len());
        prop_assert!(lines.contains(&expected));
        prop_assert_eq!(rest, body.as_slice());
    }

    #[test]
    fn prop_response_keeps_handler_content_length(length in 0u64..1_000_000) {
        let bytes = Response::new(200, "OK")
            .header("Content-Length", &length.to_string())
            .omit_content_length(true)
            .encode();
        let (lines, rest) = split_head(&bytes);
        let count = lines.iter().filter(|l| l.starts_with("Content-Length")).count();
        prop_assert_eq!(count, 1);
        prop_assert!(rest.is_empty());
    }

    #[test]
    fn prop_normalize_is_idempotent(
        host in hostname(),
        port in proptest::option::of(1u16..=65535),
        path in absolute_path(),
        query in query(),
        expect in prop_oneof![Just("100-continue"), Just("100-Continue, x-custom"), Just("")],
        value in header_value(),
    ) {
        let authority = match port {
            Some(port) => format!("{}:{}", host, port),
            None => host.clone(),
        };
        let target = match &query {
            Some(q) => format!("http://{}{}?{}", authority, path, q),
            None => format!("http://{}{}", authority, path),
        };
        let mut head = RequestHead::new("POST", &target).header("X-Value", &value);
        if !expect.is_empty() {
            head = head.header("Expect", expect);
        }
        head.version = "HTTP/1.1".to_string();

        head.normalize_for_http10().unwrap();
        let once = head.clone();
        head.normalize_for_http10().unwrap();
        prop_assert_eq!(&head, &once);

        prop_assert_eq!(head.version.as_str(), "HTTP/1.0");
        prop_assert_eq!(head.headers.get("Host"), Some(authority.as_str()));
        prop_assert!(head.target.starts_with('/'));
        prop_assert!(head
            .headers
            .get_all("Expect")
            .iter()
            .all(|v| !v.eq_ignore_ascii_case("100-continue")));

        let bytes = head.encode();
        let (lines, rest) = split_head(&bytes);
        prop_assert!(rest.is_empty());
        let line = parse_request_line(&lines[0]).unwrap();
        prop_assert_eq!(line.target, head.target);
    }
}
