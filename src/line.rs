//! スタートラインとヘッダー行のパース
//!
//! 行終端 (CRLF) は取り除かれた状態で渡される前提。

use crate::error::Error;

/// ステータスラインの最小長: "HTTP/1.x SP DDD"
const STATUS_LINE_MIN_LEN: usize = 12;

/// リクエストライン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// HTTP メソッド (GET, POST, etc.)
    pub method: String,
    /// リクエストターゲット
    pub target: String,
    /// HTTP バージョン
    pub version: String,
}

/// ステータスライン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// HTTP バージョン (HTTP/1.0 等)
    pub version: String,
    /// ステータスコード
    pub status_code: u16,
    /// ステータスフレーズ (空の場合あり)
    pub reason_phrase: String,
}

/// リクエストラインをパース
///
/// `METHOD SP target SP VERSION` を 1 つの空白で区切った 3 フィールドとして扱う。
/// フィールド数が 3 でない場合、空のフィールドがある場合はフレーミングエラー。
/// バージョンはステータスラインと同じく `HTTP/1.` + 数字 1 桁のみ受け付ける。
pub fn parse_request_line(line: &str) -> Result<RequestLine, Error> {
    let invalid = || Error::InvalidRequestLine(line.to_string());

    let fields: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = fields.as_slice() else {
        return Err(invalid());
    };
    if method.is_empty() || target.is_empty() || version.is_empty() {
        return Err(invalid());
    }
    if !is_valid_method(method) {
        return Err(invalid());
    }
    if target.bytes().any(|b| b.is_ascii_control()) {
        return Err(invalid());
    }
    if !is_http1_version(version) {
        return Err(invalid());
    }

    Ok(RequestLine {
        method: method.to_string(),
        target: target.to_string(),
        version: version.to_string(),
    })
}

/// `HTTP/1.` + 数字 1 桁か判定
fn is_http1_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 8 && bytes.starts_with(b"HTTP/1.") && bytes[7].is_ascii_digit()
}

/// ステータスラインをパース
///
/// 固定オフセットで検証する:
///
/// - 0..8: `HTTP/1.` + 数字 1 桁
/// - 8: 空白 1 つ
/// - 9..12: 数字 3 桁
/// - 12 以降: 行末、または空白 1 つ + ステータスフレーズ (残りすべて)
pub fn parse_status_line(line: &str) -> Result<StatusLine, Error> {
    let invalid = || Error::InvalidStatusLine(line.to_string());
    let bytes = line.as_bytes();

    if bytes.len() < STATUS_LINE_MIN_LEN {
        return Err(invalid());
    }
    if !bytes.starts_with(b"HTTP/1.") || !bytes[7].is_ascii_digit() {
        return Err(invalid());
    }
    if bytes[8] != b' ' {
        return Err(invalid());
    }

    let digits = &bytes[9..12];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    let status_code = digits
        .iter()
        .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));

    let reason_phrase = if bytes.len() == STATUS_LINE_MIN_LEN {
        ""
    } else if bytes[12] == b' ' {
        // 先頭 13 バイトはすべて ASCII なので文字境界
        &line[13..]
    } else {
        return Err(invalid());
    };

    Ok(StatusLine {
        version: line[..8].to_string(),
        status_code,
        reason_phrase: reason_phrase.to_string(),
    })
}

/// ヘッダー行をパース
///
/// `Name: value` を (名前, 値) に分割する。値の前後の空白は取り除く。
pub fn parse_header_line(line: &str) -> Result<(String, String), Error> {
    if line.starts_with(' ') || line.starts_with('\t') {
        return Err(Error::InvalidHeaderLine("obs-fold".to_string()));
    }
    if line.contains('\r') || line.contains('\n') {
        return Err(Error::InvalidHeaderLine("contains CR/LF".to_string()));
    }

    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| Error::InvalidHeaderLine("missing colon".to_string()))?;
    if name.is_empty() {
        return Err(Error::InvalidHeaderLine("empty name".to_string()));
    }
    if name.bytes().any(|b| b == b' ' || b == b'\t') {
        return Err(Error::InvalidHeaderLine(format!(
            "whitespace in name: {:?}",
            name
        )));
    }
    if !is_valid_header_name(name) {
        return Err(Error::InvalidHeaderLine(format!("invalid name: {:?}", name)));
    }

    // ヘッダー値の検証 (RFC 9110 Section 5.5)
    let value = value.trim_matches(|c| c == ' ' || c == '\t');
    if !is_valid_field_value(value) {
        return Err(Error::InvalidHeaderLine(format!(
            "invalid value for {}: contains control characters",
            name
        )));
    }

    Ok((name.to_string(), value.to_string()))
}

/// token 文字か判定 (RFC 9110 Section 5.6.2)
pub(crate) fn is_token_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'0'..=b'9' | b'A'..=b'Z' | b'^' | b'_' | b'`' | b'a'..=b'z' | b'|' | b'~'
    )
}

pub(crate) fn is_valid_header_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_token_char)
}

pub(crate) fn is_valid_method(method: &str) -> bool {
    !method.is_empty() && method.bytes().all(is_token_char)
}

/// field-value か判定
///
/// VCHAR / obs-text / SP / HTAB のみ許可する。
pub(crate) fn is_valid_field_value(value: &str) -> bool {
    value
        .bytes()
        .all(|b| b == b' ' || b == b'\t' || b >= 0x80 || (0x21..=0x7e).contains(&b))
}
