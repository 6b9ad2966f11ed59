#![no_main]

use libfuzzer_sys::fuzz_target;
use shiguredo_http10::{ResponseHead, encode_response_head, parse_status_line};

fuzz_target!(|data: &[u8]| {
    // UTF-8 文字列として解釈できる場合のみテスト
    if let Ok(s) = std::str::from_utf8(data) {
        let first = parse_status_line(s);
        // 同じ行は常に同じ結果になる
        assert_eq!(first, parse_status_line(s));

        if let Ok(status) = first {
            assert!(status.version.starts_with("HTTP/1."));
            assert!(status.status_code <= 999);

            // エンコードしたステータスラインは再びパースできる
            let head = ResponseHead {
                version: status.version.clone(),
                status_code: status.status_code,
                reason_phrase: status.reason_phrase.clone(),
                headers: Default::default(),
            };
            let bytes = encode_response_head(&head);
            if let Ok(text) = std::str::from_utf8(&bytes)
                && let Some(line) = text.split("\r\n").next()
                && let Ok(again) = parse_status_line(line)
            {
                assert_eq!(again.status_code, status.status_code);
            }
        }
    }
});
