#![allow(missing_docs)]

use axum_test::TestServer;
use rusqlite::Connection;

use crate::{AppState, Settings, build_router};

/// bcrypt's minimum cost, so that tests creating users stay fast.
const TEST_PASSWORD_HASH_COST: u32 = 4;

#[track_caller]
pub(crate) fn must_create_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("could not create in-memory SQLite database");
    let mut state =
        AppState::new(connection, Settings::default()).expect("could not create app state");
    state.password_hash_cost = TEST_PASSWORD_HASH_COST;

    state
}

#[track_caller]
pub(crate) fn must_create_test_server() -> TestServer {
    TestServer::try_new(build_router(must_create_test_state())).expect("Could not create test server.")
}
