//! ヘッダーマップ
//!
//! ヘッダー名 → 値リストの順序付きマップ。
//!
//! - 名前の比較は ASCII 大文字小文字を区別しない
//! - 出力には最初に現れた名前の表記を使う
//! - 同じ名前のヘッダー行が複数ある場合は 1 つのエントリーにまとめ、値は出現順に並べる
//! - 1 行の値に含まれるカンマは分割しない (値の一部として扱う)
//!
//! ```rust
//! use shiguredo_http10::Headers;
//!
//! let mut headers = Headers::new();
//! headers.append("Accept", "text/html");
//! headers.append("accept", "text/plain");
//! assert_eq!(headers.get_all("ACCEPT"), ["text/html", "text/plain"]);
//! assert_eq!(headers.get_joined("Accept").as_deref(), Some("text/html, text/plain"));
//! ```

/// 行ごとに出力するヘッダー
///
/// Set-Cookie はカンマで結合できない (RFC 6265 Section 3)。
const NON_COMBINABLE_HEADERS: &[&str] = &["Set-Cookie"];

/// 順序付きヘッダーマップ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    /// 空のヘッダーマップを作成
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// 値を追加
    ///
    /// 同じ名前のエントリーがあれば値リストの末尾に追加する。
    pub fn append(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(i) => self.entries[i].1.push(value.to_string()),
            None => self
                .entries
                .push((name.to_string(), vec![value.to_string()])),
        }
    }

    /// 値を置き換え
    ///
    /// 既存のエントリーがあれば位置と名前の表記を保ったまま値を置き換える。
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(i) => self.entries[i].1 = vec![value.to_string()],
            None => self
                .entries
                .push((name.to_string(), vec![value.to_string()])),
        }
    }

    /// エントリーを削除して値リストを返す
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        let i = self.position(name)?;
        Some(self.entries.remove(i).1)
    }

    /// 最初の値を取得
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|i| self.entries[i].1.first())
            .map(String::as_str)
    }

    /// すべての値を取得
    pub fn get_all(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(i) => &self.entries[i].1,
            None => &[],
        }
    }

    /// すべての値を ", " で結合して取得
    pub fn get_joined(&self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.entries[i].1.join(", "))
    }

    /// ヘッダーが存在するか確認
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// エントリー数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// エントリーを順に走査
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// 出力用の行を順に走査
    ///
    /// 1 つの名前につき 1 行 (値は ", " で結合)。Set-Cookie のみ値ごとに 1 行。
    pub fn lines(&self) -> impl Iterator<Item = (&str, String)> {
        self.entries.iter().flat_map(|(name, values)| {
            let lines: Vec<(&str, String)> = if NON_COMBINABLE_HEADERS
                .iter()
                .any(|n| n.eq_ignore_ascii_case(name))
            {
                values.iter().map(|v| (name.as_str(), v.clone())).collect()
            } else {
                vec![(name.as_str(), values.join(", "))]
            };
            lines
        })
    }

    /// Content-Length ヘッダーの値を取得
    ///
    /// 非負整数として解釈できない場合は `None`。
    /// 複数の値がある場合はすべて同じ値のときのみ有効とする (RFC 9110 Section 8.6)。
    pub fn content_length(&self) -> Option<u64> {
        let values = self.get_all("Content-Length");
        let first: u64 = parse_content_length_value(values.first()?)?;
        for v in &values[1..] {
            if parse_content_length_value(v)? != first {
                return None;
            }
        }
        Some(first)
    }

    /// Transfer-Encoding に chunked が含まれるか判定
    pub fn is_chunked(&self) -> bool {
        self.get_all("Transfer-Encoding").iter().any(|value| {
            value
                .split(',')
                .any(|token| token.trim().eq_ignore_ascii_case("chunked"))
        })
    }
}

fn parse_content_length_value(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a [String]);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a [String])> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
