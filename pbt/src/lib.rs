//! PBT テスト共通ユーティリティ

use proptest::prelude::*;

// ========================================
// トークン生成 (RFC 9110 Section 5.6.2)
// ========================================

/// tchar
pub fn token_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        prop::sample::select(vec![
            '!', '#', '$', '%', '&', '\'', '*', '+', '-', '.', '^', '_', '`', '|', '~',
        ]),
    ]
}

/// token (1-16 文字)
pub fn token() -> impl Strategy<Value = String> {
    proptest::collection::vec(token_char(), 1..=16).prop_map(|chars| chars.into_iter().collect())
}

/// HTTP メソッド
pub fn method() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("GET".to_string()),
        Just("HEAD".to_string()),
        Just("POST".to_string()),
        Just("PUT".to_string()),
        Just("DELETE".to_string()),
        token(),
    ]
}

/// HTTP/1.x バージョン
pub fn http1_version() -> impl Strategy<Value = String> {
    (0u8..=9).prop_map(|minor| format!("HTTP/1.{}", minor))
}

/// 3 桁のステータスコード
pub fn status_code() -> impl Strategy<Value = u16> {
    100u16..=999
}

/// ステータスフレーズ (空白を含む可視 ASCII、空の場合あり)
pub fn reason_phrase() -> impl Strategy<Value = String> {
    "[ -~]{0,40}".prop_map(|s| s)
}

// ========================================
// ヘッダー生成
// ========================================

/// ヘッダー名
pub fn header_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Host".to_string()),
        Just("Content-Type".to_string()),
        Just("X-Custom".to_string()),
        token(),
    ]
}

/// ヘッダー値 (前後に空白を持たない)
pub fn header_value() -> impl Strategy<Value = String> {
    prop_oneof![
        "[!-~]{1,32}".prop_map(|s| s),
        ("[!-~]{1,16}", "[!-~]{1,16}").prop_map(|(a, b)| format!("{} {}", a, b)),
    ]
}

// ========================================
// リクエストターゲット生成
// ========================================

/// パスセグメント
pub fn path_segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9._~!$&'()*+,;=:@-]{1,16}".prop_map(|s| s)
}

/// origin-form のパス
pub fn absolute_path() -> impl Strategy<Value = String> {
    proptest::collection::vec(path_segment(), 0..=3).prop_map(|segments| {
        format!("/{}", segments.join("/"))
    })
}

/// クエリ
pub fn query() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[A-Za-z0-9=&_-]{0,16}".prop_map(|s| s))
}

/// ホスト名
pub fn hostname() -> impl Strategy<Value = String> {
    "[a-z]{1,12}".prop_map(|s| format!("{}.example", s))
}
