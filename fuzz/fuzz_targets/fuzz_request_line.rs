#![no_main]

use libfuzzer_sys::fuzz_target;
use shiguredo_http10::{DEFAULT_AUTHORITY, RequestTarget, parse_request_line, parse_status_line};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(line) = parse_request_line(s) {
            // 3 フィールドを空白 1 つで結合すると元の行に戻る
            let joined = format!("{} {} {}", line.method, line.target, line.version);
            assert_eq!(joined, s);

            // サーバーはこのバージョンをステータスラインにそのまま使う
            let status = format!("{} 200 OK", line.version);
            assert!(parse_status_line(&status).is_ok());

            if let Ok(target) = RequestTarget::resolve(&line.target, DEFAULT_AUTHORITY) {
                let _ = target.host();
                let _ = target.port_or_default();
                let _ = target.origin_form();
            }
        }
    }
});
