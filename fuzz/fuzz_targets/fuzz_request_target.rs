#![no_main]

use libfuzzer_sys::fuzz_target;
use shiguredo_http10::{DEFAULT_AUTHORITY, RequestTarget};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(target) = RequestTarget::resolve(s, DEFAULT_AUTHORITY) {
            let _ = target.scheme();
            let _ = target.authority();
            let _ = target.host();
            let _ = target.port();
            let _ = target.path();
            let _ = target.query();

            // 解決済みのターゲットを再度解決しても変わらない (asterisk-form を除く)
            if target.path() == "*" {
                return;
            }
            let again = RequestTarget::resolve(&target.to_string(), DEFAULT_AUTHORITY);
            if let Ok(again) = again {
                assert_eq!(again.origin_form(), target.origin_form());
            }
        }
    }
});
