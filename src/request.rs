//! リクエストヘッダー
//!
//! [`RequestHead::normalize_for_http10`] で HTTP/1.0 として送信できる形に揃える。

use crate::error::EncodeError;
use crate::headers::Headers;
use crate::line::{is_valid_field_value, is_valid_header_name, is_valid_method};
use crate::target::{DEFAULT_AUTHORITY, RequestTarget, is_absolute};

/// サポートする最低の (そして唯一送信する) バージョン
pub const HTTP_10: &str = "HTTP/1.0";

/// HTTP リクエストヘッダー (ボディなし)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    /// HTTP メソッド (GET, POST, etc.)
    pub method: String,
    /// リクエストターゲット (絶対 URI または相対参照)
    pub target: String,
    /// HTTP バージョン
    pub version: String,
    /// ヘッダー
    pub headers: Headers,
}

impl RequestHead {
    /// 新しいリクエストヘッダーを作成 (HTTP/1.0)
    pub fn new(method: &str, target: &str) -> Self {
        Self {
            method: method.to_string(),
            target: target.to_string(),
            version: HTTP_10.to_string(),
            headers: Headers::new(),
        }
    }

    /// ヘッダーを追加 (ビルダーパターン)
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }

    /// HEAD リクエストか判定
    pub fn is_head(&self) -> bool {
        self.method.eq_ignore_ascii_case("HEAD")
    }

    /// HTTP/1.0 で送信できる形に正規化
    ///
    /// - バージョンを HTTP/1.0 に固定する
    /// - Transfer-Encoding: chunked はフレーミングできないためエラー
    /// - Expect: 100-continue は中間レスポンスのフェーズがないため取り除く
    /// - 絶対 URI は origin-form にし、Host がなければオーソリティから追加する
    /// - ヘッダー名が token でない場合、値に制御文字が含まれる場合はエラー
    /// - 絶対 URI の userinfo は Host ヘッダーに含めない
    ///
    /// 何度呼び出しても結果は変わらない。
    pub fn normalize_for_http10(&mut self) -> Result<(), EncodeError> {
        self.version = HTTP_10.to_string();

        if self.headers.is_chunked() {
            return Err(EncodeError::ChunkedTransferEncoding);
        }

        for (name, values) in &self.headers {
            if !is_valid_header_name(name) || !values.iter().all(|v| is_valid_field_value(v)) {
                return Err(EncodeError::InvalidHeader(name.to_string()));
            }
        }
        if !is_valid_method(&self.method) {
            return Err(EncodeError::InvalidHeader(self.method.clone()));
        }

        remove_expect_continue(&mut self.headers);

        if is_absolute(&self.target) {
            let target = RequestTarget::resolve(&self.target, DEFAULT_AUTHORITY)
                .map_err(|e| EncodeError::InvalidHeader(e.to_string()))?;
            // userinfo は送信しない
            if !self.headers.contains("Host") {
                self.headers.append("Host", target.host_port());
            }
            self.target = target.origin_form();
        }
        if self.target.is_empty() || self.target.bytes().any(|b| b == b' ' || b.is_ascii_control())
        {
            return Err(EncodeError::InvalidHeader(self.target.clone()));
        }

        Ok(())
    }
}

/// Expect ヘッダーから 100-continue を取り除く
///
/// 他の期待値は残す。値が空になったらヘッダーごと削除する。
fn remove_expect_continue(headers: &mut Headers) {
    let kept: Vec<String> = headers
        .get_all("Expect")
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("100-continue"))
        .map(str::to_string)
        .collect();
    if !headers.contains("Expect") {
        return;
    }
    let Some((first, rest)) = kept.split_first() else {
        headers.remove("Expect");
        return;
    };
    // 位置と名前の表記を保つ
    headers.insert("Expect", first);
    for value in rest {
        headers.append("Expect", value);
    }
}
