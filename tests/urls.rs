use std::collections::BTreeMap;

use http_expect::urls::{build_url, string_query_parameter, UrlBuilder, UrlError};

#[test]
fn segments_are_joined_by_a_single_slash() {
    let url = build_url("http://x.test", &["/a/", "/b", "c/"]).unwrap();

    assert_eq!(url, "http://x.test/a/b/c/");
}

#[test]
fn no_parts_returns_the_base_url_unchanged() {
    let parts: [&str; 0] = [];

    assert_eq!(build_url("http://x.test", &parts).unwrap(), "http://x.test");
    // Not even validated
    assert_eq!(build_url("not a url", &parts).unwrap(), "not a url");
}

#[test]
fn query_parameters_are_appended_after_the_path() {
    let url = UrlBuilder::new("http://x.test")
        .query_param("q", "1")
        .part("search")
        .build()
        .unwrap();

    assert_eq!(url, "http://x.test/search?q=1");
}

#[test]
fn query_parameters_keep_the_iteration_order_of_the_mapping() {
    let params = BTreeMap::from([("b", "2"), ("a", "1"), ("c", "3")]);

    let url = UrlBuilder::new("http://x.test")
        .query_params(params)
        .part("search")
        .build()
        .unwrap();

    assert_eq!(url, "http://x.test/search?a=1&b=2&c=3");
}

#[test]
fn query_values_are_not_percent_encoded() {
    let url = UrlBuilder::new("http://x.test")
        .query_param("name", string_query_parameter("widget"))
        .part("search")
        .build()
        .unwrap();

    assert_eq!(url, "http://x.test/search?name=%22widget%22");
}

#[test]
fn lone_slashes_and_blank_parts_are_dropped() {
    assert_eq!(
        build_url("http://x.test", &["a", "/", "b"]).unwrap(),
        "http://x.test/a/b"
    );
    assert_eq!(
        build_url("http://x.test", &["a", "", "  ", "b"]).unwrap(),
        "http://x.test/a/b"
    );
}

#[test]
fn a_base_url_with_a_trailing_slash_is_not_doubled() {
    let url = build_url("http://x.test/", &["/a"]).unwrap();

    assert_eq!(url, "http://x.test/a");
}

#[test]
fn the_base_url_is_not_repeated_when_the_first_part_is_already_absolute() {
    let url = build_url("http://x.test", &["http://x.test/a", "b"]).unwrap();

    assert_eq!(url, "http://x.test/a/b");
}

#[test]
fn a_non_root_base_path_is_ignored() {
    let url = UrlBuilder::new("http://x.test")
        .base_path("/api")
        .parts(&["b"])
        .build()
        .unwrap();

    assert_eq!(url, "http://x.test/b");
}

#[test]
fn a_root_or_empty_base_path_contributes_nothing() {
    for base_path in ["/", "", "  "] {
        let url = UrlBuilder::new("http://x.test")
            .base_path(base_path)
            .part("widgets")
            .build()
            .unwrap();

        assert_eq!(url, "http://x.test/widgets");
    }
}

#[test]
fn an_invalid_url_is_rejected() {
    let outcome = build_url("x.test", &["widgets"]);

    match outcome {
        Err(UrlError::Malformed { url, .. }) => assert_eq!(url, "x.test/widgets"),
        Ok(url) => panic!("Expected an error, got {}", url),
    }
}

#[test]
fn string_query_parameters_are_wrapped_in_encoded_quotes() {
    assert_eq!(string_query_parameter("foo"), "%22foo%22");
    assert_eq!(string_query_parameter(42), "%2242%22");
}
