//! リクエストターゲット解決のプロパティテスト

use pbt::{absolute_path, hostname, query};
use proptest::prelude::*;
use shiguredo_http10::{DEFAULT_AUTHORITY, RequestTarget};

proptest! {
    #[test]
    fn prop_origin_form_resolves_against_default_authority(
        path in absolute_path(),
        query in query(),
        fragment in proptest::option::of("[a-z]{1,8}"),
    ) {
        let mut target = path.clone();
        if let Some(q) = &query {
            target.push('?');
            target.push_str(q);
        }
        let origin_form = target.clone();
        if let Some(f) = &fragment {
            target.push('#');
            target.push_str(f);
        }

        let resolved = RequestTarget::resolve(&target, DEFAULT_AUTHORITY).unwrap();
        prop_assert_eq!(resolved.scheme(), "http");
        prop_assert_eq!(resolved.authority(), "localhost");
        prop_assert_eq!(resolved.path(), path.as_str());
        prop_assert_eq!(resolved.query(), query.as_deref());
        // フラグメントは捨てられる
        prop_assert_eq!(resolved.origin_form(), origin_form);
    }

    #[test]
    fn prop_absolute_target(
        host in hostname(),
        port in proptest::option::of(1u16..=65535),
        path in absolute_path(),
    ) {
        let authority = match port {
            Some(port) => format!("{}:{}", host, port),
            None => host.clone(),
        };
        let uri = format!("http://{}{}", authority, path);
        let resolved = RequestTarget::resolve(&uri, DEFAULT_AUTHORITY).unwrap();
        prop_assert_eq!(resolved.host(), host.as_str());
        prop_assert_eq!(resolved.port(), port);
        prop_assert_eq!(resolved.port_or_default(), port.unwrap_or(80));
        prop_assert_eq!(resolved.path(), path.as_str());
        prop_assert_eq!(resolved.to_string(), uri);
    }
}

#[test]
fn asterisk_form() {
    let resolved = RequestTarget::resolve("*", DEFAULT_AUTHORITY).unwrap();
    assert_eq!(resolved.path(), "*");
    assert_eq!(resolved.authority(), "localhost");
}
