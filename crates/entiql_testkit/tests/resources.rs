//! Resource release on every exit path.

use entiql_core::{Config, CoreError, QueryState};
use entiql_driver::DriverEvent;
use entiql_testkit::prelude::*;

fn closes(journal: &entiql_driver::Journal) -> (usize, usize, usize) {
    (
        journal.count(|e| matches!(e, DriverEvent::CursorClosed { .. })),
        journal.count(|e| matches!(e, DriverEvent::StatementClosed { .. })),
        journal.count(|e| matches!(e, DriverEvent::ConnectionClosed { .. })),
    )
}

#[test]
fn partial_consumption_then_close_twice() {
    let fixture = UserFixture::new(Config::default());
    fixture.serve_all();

    let mut stream = fixture.manager.stream().stream().unwrap();
    stream.next().unwrap().unwrap();
    stream.next().unwrap().unwrap();
    assert_eq!(fixture.journal.open_resources(), 3);

    stream.close().unwrap();
    stream.close().unwrap();
    assert_eq!(stream.state(), QueryState::Closed);
    assert_eq!(closes(&fixture.journal), (1, 1, 1));
    assert_eq!(fixture.journal.open_resources(), 0);
}

#[test]
fn release_order_is_cursor_statement_connection() {
    let fixture = UserFixture::new(Config::default());
    fixture.serve_all();

    let mut stream = fixture.manager.stream().stream().unwrap();
    stream.next().unwrap().unwrap();
    stream.close().unwrap();

    let closes: Vec<&'static str> = fixture
        .journal
        .events()
        .iter()
        .filter_map(|e| match e {
            DriverEvent::CursorClosed { .. } => Some("cursor"),
            DriverEvent::StatementClosed { .. } => Some("statement"),
            DriverEvent::ConnectionClosed { .. } => Some("connection"),
            _ => None,
        })
        .collect();
    assert_eq!(closes, vec!["cursor", "statement", "connection"]);
}

#[test]
fn limit_exhaustion_releases_without_close() {
    let fixture = UserFixture::new(Config::default());
    fixture.serve_all();

    let mut stream = fixture.manager.stream().limit(2).stream().unwrap();
    assert_eq!(stream.next().unwrap().unwrap().id, 1);
    assert_eq!(stream.next().unwrap().unwrap().id, 2);
    assert!(stream.next().is_none());

    assert_eq!(stream.state(), QueryState::Closed);
    assert_eq!(fixture.journal.open_resources(), 0);
    assert_eq!(fixture.journal.fetched_rows(), 2);
    assert_eq!(closes(&fixture.journal), (1, 1, 1));

    assert!(stream.next().is_none());
    stream.close().unwrap();
    assert_eq!(closes(&fixture.journal), (1, 1, 1));
}

#[test]
fn limit_inside_for_loop_releases_at_loop_end() {
    let fixture = UserFixture::new(Config::default());
    fixture.serve_all();

    let mut stream = fixture
        .manager
        .stream()
        .filter_with(|u: &User| u.age.is_some())
        .limit(3)
        .stream()
        .unwrap();
    let mut seen = 0;
    for user in stream.by_ref() {
        user.unwrap();
        seen += 1;
    }
    assert_eq!(seen, 3);
    assert_eq!(stream.state(), QueryState::Closed);
    assert_eq!(fixture.journal.open_resources(), 0);
}

#[test]
fn abandoned_stream_is_released_on_drop() {
    let fixture = UserFixture::new(Config::default());
    fixture.serve_all();
    {
        let mut stream = fixture.manager.stream().limit(5).stream().unwrap();
        stream.next().unwrap().unwrap();
    }
    assert_eq!(closes(&fixture.journal), (1, 1, 1));
}

#[test]
fn error_mid_fetch_leaves_nothing_open() {
    let fixture = UserFixture::new(Config::default());
    let rows = user_rows(&fixture.users[..3]);
    fixture
        .source
        .fail_after(fixture.manager.sql().select(), rows, "connection reset by peer");

    let err = fixture.manager.stream().to_vec().unwrap_err();
    match err {
        CoreError::Execution { sql, binds, source } => {
            assert_eq!(sql, fixture.manager.sql().select());
            assert!(binds.is_empty());
            assert!(source.to_string().contains("connection reset"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fixture.journal.fetched_rows(), 3);
    assert_eq!(fixture.journal.open_resources(), 0);
    assert_eq!(closes(&fixture.journal), (1, 1, 1));
}

#[test]
fn error_mid_fetch_with_pushed_binds_reports_them() {
    let fixture = UserFixture::new(Config::default());
    let age = fixture.manager.field("age");
    let sql = format!("{} WHERE (\"age\" > ?)", fixture.manager.sql().select());
    fixture.source.fail_after(&sql, Vec::new(), "timeout");

    let err = fixture
        .manager
        .stream()
        .filter(age.greater_than(21))
        .to_vec()
        .unwrap_err();
    assert!(err.is_execution());
    match err {
        CoreError::Execution { binds, .. } => {
            assert_eq!(binds, vec![entiql_driver::Value::Integer(21)]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fixture.journal.open_resources(), 0);
}

#[test]
fn error_while_executing_leaves_nothing_open() {
    let fixture = UserFixture::new(Config::default());
    fixture
        .source
        .fail_on_execute(fixture.manager.sql().select(), "permission denied");

    let mut stream = fixture.manager.stream().stream().unwrap();
    assert!(matches!(stream.next(), Some(Err(CoreError::Execution { .. }))));
    assert!(stream.next().is_none());
    assert_eq!(fixture.journal.open_resources(), 0);
    stream.close().unwrap();
}

#[test]
fn error_inside_sorted_still_releases() {
    let fixture = UserFixture::new(Config::default());
    let rows = user_rows(&fixture.users[..2]);
    fixture
        .source
        .fail_after(fixture.manager.sql().select(), rows, "reset");

    let result = fixture
        .manager
        .stream()
        .sorted_by(|a, b| a.id.cmp(&b.id))
        .to_vec();
    assert!(result.is_err());
    assert_eq!(fixture.journal.open_resources(), 0);
}
