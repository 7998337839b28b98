//! Skip wiremock-backed tests where localhost sockets cannot be bound
//! (some sandboxes). Set `CLEANLINK_REQUIRE_SOCKET_TESTS=1` in CI to turn the
//! skip into a failure.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "CLEANLINK_REQUIRE_SOCKET_TESTS";

fn socket_tests_required() -> bool {
    std::env::var(REQUIRE_ENV)
        .ok()
        .is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Returns true when localhost cannot be bound and the test should return early.
#[track_caller]
pub fn should_skip_socket_bound_test() -> bool {
    let Err(error) = TcpListener::bind("127.0.0.1:0") else {
        return false;
    };

    let caller = Location::caller();
    let message = format!(
        "[socket-bound-test] {}:{} cannot bind 127.0.0.1 ({error})",
        caller.file(),
        caller.line()
    );
    assert!(!socket_tests_required(), "{message}; unset {REQUIRE_ENV} to allow skipping");
    eprintln!("{message}; skipping. Set {REQUIRE_ENV}=1 to fail instead.");
    true
}

/// Starts a mock server, or returns `None` when the test should be skipped.
#[track_caller]
pub fn start_mock_server_or_skip() -> impl std::future::Future<Output = Option<MockServer>> {
    let skip = should_skip_socket_bound_test();
    async move {
        if skip {
            None
        } else {
            Some(MockServer::start().await)
        }
    }
}
