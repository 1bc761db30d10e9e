use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http_expect::http::StatusCode;
use http_expect::{
    AccessKey, ContentResponse, DispatchError, ExpectationRouter, Method, Reply, Request,
    Response,
};

fn get(target: &str) -> Request {
    Request::new(Method::GET, target)
}

#[test]
fn returns_404_with_an_empty_body_if_nothing_matches() {
    // Arrange
    let mut router = ExpectationRouter::new();

    // Act
    let response = router.dispatch(&get("/missing")).unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.body().is_empty());
}

#[test]
fn registered_error_is_returned_and_counted() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.register_error("GET", "/widgets", 500, "boom");

    // Act
    let response = router.dispatch(&get("/widgets")).unwrap();

    // Assert
    assert_eq!(response.status(), 500);
    assert_eq!(response.body_string(), "boom");
    assert_eq!(router.accesses_for_method("GET", "/widgets"), Some(1));
}

#[test]
fn registered_errors_take_priority_over_expectations() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.expect("GET", "/widgets", 200, "[]");
    router.register_error("GET", "/widgets", 503, "unavailable");

    // Act
    let response = router.dispatch(&get("/widgets")).unwrap();

    // Assert
    assert_eq!(response.status(), 503);
    assert_eq!(response.body_string(), "unavailable");
}

#[test]
fn bare_error_status_has_no_body() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.register_error_status("DELETE", "/widgets/1", 409);

    // Act
    let response = router
        .dispatch(&Request::new(Method::DELETE, "/widgets/1"))
        .unwrap();

    // Assert
    assert_eq!(response.status(), 409);
    assert!(response.body().is_empty());
}

#[test]
fn the_last_registration_wins() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.expect("GET", "/widgets", 200, "first");
    router.expect("GET", "/widgets", 201, "second");

    // Act
    let response = router.dispatch(&get("/widgets")).unwrap();

    // Assert
    assert_eq!(response.status(), 201);
    assert_eq!(response.body_string(), "second");
    assert_eq!(router.expectations().len(), 1);
}

#[test]
fn access_counts_grow_by_one_per_request_whatever_the_outcome() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.expect("GET", "/ok", 200, "ok");
    router.register_error("GET", "/ko", 500, "ko");

    // Act
    for _ in 0..3 {
        router.dispatch(&get("/ok")).unwrap();
        router.dispatch(&get("/ko")).unwrap();
        router.dispatch(&get("/missing")).unwrap();
    }

    // Assert
    assert_eq!(router.accesses_for("/ok"), Some(3));
    assert_eq!(router.accesses_for("/ko"), Some(3));
    assert_eq!(router.accesses_for("/missing"), Some(3));
    assert_eq!(router.accesses_by_path().len(), 3);
}

#[test]
fn untouched_keys_have_no_access_count() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.expect("GET", "/widgets", 200, "[]");

    // Act
    router.dispatch(&get("/widgets")).unwrap();

    // Assert
    assert_eq!(router.accesses_for("/gadgets"), None);
    // Same path, different method
    assert_eq!(router.accesses_for_method("POST", "/widgets"), None);
}

#[test]
fn methods_are_case_insensitive_when_registering_and_counting() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.expect("post", "/widgets", 201, "created");

    // Act
    let response = router
        .dispatch(&Request::new(Method::POST, "/widgets"))
        .unwrap();

    // Assert
    assert_eq!(response.status(), 201);
    assert_eq!(router.accesses_for_method("Post", "/widgets"), Some(1));
    assert_eq!(
        router.accesses_by_path().get(&AccessKey::new("POST", "/widgets")),
        Some(&1)
    );
}

#[test]
fn absolute_registration_urls_are_reduced_to_their_path() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.expect("GET", "http://localhost:9999/api/widgets?page=2", 200, "[]");

    // Act
    let response = router.dispatch(&get("/api/widgets?page=1")).unwrap();

    // Assert
    assert_eq!(response.status(), 200);
    assert!(router.expectations().contains_key("GET /api/widgets"));
}

#[test]
fn a_bare_origin_registration_url_matches_the_root_path() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.expect("GET", "http://localhost:9999", 200, "home");

    // Act
    let response = router.dispatch(&get("/")).unwrap();

    // Assert
    assert_eq!(response.status(), 200);
    assert_eq!(response.body_string(), "home");
    assert!(router.expectations().contains_key("GET /"));
}

#[test]
fn registration_urls_without_a_host_are_used_as_typed() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.expect("GET", "localhost:8080/widgets", 200, "[]");

    // Assert
    assert!(router
        .expectations()
        .contains_key("GET localhost:8080/widgets"));
}

#[test]
fn relative_registration_urls_are_used_as_typed() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.register_error("GET", "/foo/bar", 500, "boom");

    // Assert
    let errors = router.registered_errors();
    let error = errors.get("GET /foo/bar").unwrap();
    assert_eq!(error.path(), "/foo/bar");
    assert_eq!(error.method(), "GET");
    assert_eq!(error.code(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[test]
fn absolute_form_request_targets_are_keyed_by_their_path() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.expect("GET", "/widgets", 200, "[]");

    // Act
    let response = router
        .dispatch(&get("http://localhost:8080/widgets"))
        .unwrap();

    // Assert
    assert_eq!(response.status(), 200);
    assert_eq!(router.accesses_for("/widgets"), Some(1));
}

#[test]
fn a_malformed_request_target_is_a_dispatch_error() {
    // Arrange
    let mut router = ExpectationRouter::new();

    // Act
    let outcome = router.dispatch(&get("/not a valid target"));

    // Assert
    match outcome {
        Err(DispatchError::InvalidTarget { target, .. }) => {
            assert_eq!(target, "/not a valid target")
        }
        other => panic!("Expected an invalid target error, got {:?}", other),
    }
    assert!(router.accesses_by_path().is_empty());
}

#[test]
fn stream_bodies_are_copied_into_the_response() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.expect_stream("GET", "/file", 200, Cursor::new(vec![0u8, 159, 146, 150]));

    // Act
    let response = router.dispatch(&get("/file")).unwrap();

    // Assert
    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), &[0u8, 159, 146, 150]);
}

#[test]
fn stream_bodies_are_drained_by_the_first_response() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.expect_stream("GET", "/file", 200, Cursor::new(b"once".to_vec()));

    // Act
    let first = router.dispatch(&get("/file")).unwrap();
    let second = router.dispatch(&get("/file")).unwrap();

    // Assert
    assert_eq!(first.body(), b"once");
    assert_eq!(second.status(), 200);
    assert!(second.body().is_empty());
}

#[test]
fn stream_errors_keep_their_status_and_body() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.register_error_response(ContentResponse::stream(
        "GET",
        "/file",
        502,
        Cursor::new(b"bad gateway".to_vec()),
    ));

    // Act
    let response = router.dispatch(&get("/file")).unwrap();

    // Assert
    assert_eq!(response.status(), 502);
    assert_eq!(response.body_string(), "bad gateway");
}

#[test]
fn bare_status_expectations_have_an_empty_body() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.expect_status("PUT", "/widgets/1", 204);

    // Act
    let response = router
        .dispatch(&Request::new(Method::PUT, "/widgets/1"))
        .unwrap();

    // Assert
    assert_eq!(response.status(), 204);
    assert!(response.body().is_empty());
}

#[test]
fn handlers_take_full_control_of_the_response() {
    // Arrange
    let mut router = ExpectationRouter::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let handler_calls = calls.clone();
    router.expect_handler("POST", "/echo", move |request: &Request, response: &mut Response| {
        handler_calls.fetch_add(1, Ordering::SeqCst);
        response.set_status(202);
        response.insert_header("x-echo", "true");
        response.write_bytes(&request.body);
    });

    // Act
    let request = Request::new(Method::POST, "/echo").with_body("ping");
    let response = router.dispatch(&request).unwrap();

    // Assert
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(response.status(), 202);
    assert_eq!(response.headers().get("x-echo").unwrap(), "true");
    assert_eq!(response.body_string(), "ping");
    assert_eq!(router.accesses_for_method("POST", "/echo"), Some(1));
}

#[test]
fn handlers_registered_as_errors_are_invoked_too() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.expect("GET", "/flaky", 200, "fine");
    router.register_error_response(ContentResponse::handler(
        "GET",
        "/flaky",
        |_: &Request, response: &mut Response| {
            response.send_error(StatusCode::TOO_MANY_REQUESTS, Some("slow down"));
        },
    ));

    // Act
    let response = router.dispatch(&get("/flaky")).unwrap();

    // Assert
    assert_eq!(response.status(), 429);
    assert_eq!(response.body_string(), "slow down");
    assert!(matches!(
        router.registered_errors().get("GET /flaky").unwrap().reply(),
        Reply::Handler(_)
    ));
}

#[test]
fn reset_forgets_everything() {
    // Arrange
    let mut router = ExpectationRouter::new();
    router.expect("GET", "/widgets", 200, "[]");
    router.register_error("GET", "/gadgets", 500, "boom");
    router.dispatch(&get("/widgets")).unwrap();

    // Act
    router.reset();

    // Assert
    assert!(router.expectations().is_empty());
    assert!(router.registered_errors().is_empty());
    assert!(router.accesses_by_path().is_empty());
    assert_eq!(
        router.dispatch(&get("/widgets")).unwrap().status(),
        StatusCode::NOT_FOUND
    );
}

#[test]
fn base_resource_always_starts_with_a_slash() {
    assert_eq!(ExpectationRouter::new().base_resource(), "/");
    assert_eq!(
        ExpectationRouter::with_base_resource("api").base_resource(),
        "/api"
    );
    assert_eq!(
        ExpectationRouter::with_base_resource("/api").base_resource(),
        "/api"
    );
}
