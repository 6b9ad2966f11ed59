#![no_main]

use libfuzzer_sys::fuzz_target;
use shiguredo_http10::{DecoderLimits, Headers, parse_header_line};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let limits = DecoderLimits::default();
        let mut headers = Headers::new();

        for (count, line) in s.split("\r\n").enumerate() {
            if limits.check_line(line.len()).is_err() || limits.check_headers_count(count + 1).is_err() {
                break;
            }
            if let Ok((name, value)) = parse_header_line(line) {
                headers.append(&name, &value);
            }
        }

        let _ = headers.content_length();
        let _ = headers.is_chunked();
        for (name, value) in headers.lines() {
            // パース済みのヘッダーを出力しても CR / LF は入らない
            assert!(!name.contains(['\r', '\n']));
            assert!(!value.contains(['\r', '\n']));
        }
    }
});
