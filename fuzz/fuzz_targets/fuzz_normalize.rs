#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shiguredo_http10::{RequestHead, parse_header_line, parse_request_line};

#[derive(Debug, Arbitrary)]
struct Input {
    method: String,
    target: String,
    headers: Vec<(String, String)>,
}

fuzz_target!(|input: Input| {
    let mut head = RequestHead::new(&input.method, &input.target);
    for (name, value) in &input.headers {
        head.headers.append(name, value);
    }

    if head.normalize_for_http10().is_ok() {
        // 正規化は何度行っても結果が変わらない
        let once = head.clone();
        assert!(head.normalize_for_http10().is_ok());
        assert_eq!(head, once);
        assert_eq!(head.version, "HTTP/1.0");
        assert!(!head.headers.is_chunked());

        // エンコード結果はそのままパーサーで読み戻せる
        let bytes = head.encode();
        let text = std::str::from_utf8(&bytes).unwrap();
        let text = text.strip_suffix("\r\n\r\n").unwrap();
        let mut lines = text.split("\r\n");
        let request_line = parse_request_line(lines.next().unwrap()).unwrap();
        assert_eq!(request_line.target, head.target);
        for line in lines {
            let (name, _) = parse_header_line(line).unwrap();
            assert!(head.headers.contains(&name));
        }
    }
});
