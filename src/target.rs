//! リクエストターゲットの解決
//!
//! 絶対 URI はそのまま分解し、それ以外は既定のオーソリティを基準に解決する。
//!
//! ```rust
//! use shiguredo_http10::{DEFAULT_AUTHORITY, RequestTarget};
//!
//! let target = RequestTarget::resolve("/search?q=rust#top", DEFAULT_AUTHORITY).unwrap();
//! assert_eq!(target.scheme(), "http");
//! assert_eq!(target.authority(), "localhost");
//! assert_eq!(target.path(), "/search");
//! assert_eq!(target.query(), Some("q=rust"));
//! ```

use crate::error::Error;

/// 相対ターゲットを解決する際の既定のオーソリティ
pub const DEFAULT_AUTHORITY: &str = "http://localhost";

/// 解決済みのリクエストターゲット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    scheme: String,
    authority: String,
    path: String,
    query: Option<String>,
}

impl RequestTarget {
    /// ターゲットを解決
    ///
    /// - `scheme://authority/path?query` 形式はそのまま分解する
    /// - `*` (asterisk-form) はパス `*` として扱う
    /// - それ以外は `base` (絶対 URI) を基準にした相対参照として扱う
    ///
    /// フラグメントは捨てる。
    pub fn resolve(target: &str, base: &str) -> Result<Self, Error> {
        if target.is_empty() {
            return Err(Error::InvalidTarget("empty target".to_string()));
        }
        if target.bytes().any(|b| b.is_ascii_control() || b == b' ') {
            return Err(Error::InvalidTarget(target.to_string()));
        }

        if is_absolute(target) {
            return Self::parse_absolute(target);
        }

        let base = Self::parse_absolute(base)?;
        if target == "*" {
            return Ok(Self {
                path: "*".to_string(),
                query: None,
                ..base
            });
        }

        let (path, query) = split_path_and_query(strip_fragment(target));
        let path = if path.starts_with('/') {
            path.to_string()
        } else if path.is_empty() {
            // クエリのみの参照は基準のパスを引き継ぐ (RFC 3986 Section 5.2.2)
            base.path.clone()
        } else {
            merge_path(&base.path, path)
        };

        Ok(Self {
            scheme: base.scheme,
            authority: base.authority,
            path,
            query: query.map(str::to_string),
        })
    }

    fn parse_absolute(uri: &str) -> Result<Self, Error> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| Error::InvalidTarget(format!("not an absolute URI: {}", uri)))?;
        if !is_valid_scheme(scheme) {
            return Err(Error::InvalidTarget(format!("invalid scheme: {}", uri)));
        }

        let rest = strip_fragment(rest);
        let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
        let (authority, path_and_query) = rest.split_at(authority_end);
        if authority.is_empty() {
            return Err(Error::InvalidTarget(format!("missing authority: {}", uri)));
        }

        let (path, query) = split_path_and_query(path_and_query);
        let path = if path.is_empty() { "/" } else { path };

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            authority: authority.to_string(),
            path: path.to_string(),
            query: query.map(str::to_string),
        })
    }

    /// スキーム (小文字)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// オーソリティ (host[:port])
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// ホスト
    ///
    /// userinfo は取り除く。IPv6 リテラルは角括弧付きのまま返す。
    pub fn host(&self) -> &str {
        let host_port = self.host_port();
        if host_port.starts_with('[') {
            return match host_port.find(']') {
                Some(end) => &host_port[..=end],
                None => host_port,
            };
        }
        match host_port.rsplit_once(':') {
            Some((host, _)) => host,
            None => host_port,
        }
    }

    /// ポート (明示されている場合)
    pub fn port(&self) -> Option<u16> {
        let host_port = self.host_port();
        let after_host = if host_port.starts_with('[') {
            &host_port[host_port.find(']').map_or(host_port.len(), |end| end + 1)..]
        } else {
            host_port.rfind(':').map_or("", |i| &host_port[i..])
        };
        after_host.strip_prefix(':').and_then(|p| p.parse().ok())
    }

    /// ポート (スキームの既定値を含む)
    pub fn port_or_default(&self) -> u16 {
        self.port()
            .unwrap_or(if self.scheme == "https" { 443 } else { 80 })
    }

    /// userinfo を除いたオーソリティ (host[:port])
    ///
    /// Host ヘッダーの値に使う。
    pub fn host_port(&self) -> &str {
        match self.authority.rsplit_once('@') {
            Some((_, host_port)) => host_port,
            None => &self.authority,
        }
    }

    /// パス
    pub fn path(&self) -> &str {
        &self.path
    }

    /// クエリ (`?` を含まない)
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// origin-form (`path[?query]`) を構築
    pub fn origin_form(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

impl std::fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.origin_form())
    }
}

/// 絶対 URI (`scheme://...`) か判定
pub fn is_absolute(target: &str) -> bool {
    target
        .split_once("://")
        .is_some_and(|(scheme, _)| is_valid_scheme(scheme))
}

/// scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) (RFC 3986 Section 3.1)
fn is_valid_scheme(scheme: &str) -> bool {
    let mut bytes = scheme.bytes();
    bytes.next().is_some_and(|b| b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
}

fn strip_fragment(s: &str) -> &str {
    s.split_once('#').map_or(s, |(before, _)| before)
}

fn split_path_and_query(s: &str) -> (&str, Option<&str>) {
    match s.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (s, None),
    }
}

/// 基準パスの最後のセグメントを相対パスで置き換える (RFC 3986 Section 5.2.3)
fn merge_path(base: &str, relative: &str) -> String {
    match base.rfind('/') {
        Some(i) => format!("{}{}", &base[..=i], relative),
        None => format!("/{}", relative),
    }
}
