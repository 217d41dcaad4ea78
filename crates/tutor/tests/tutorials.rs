//
// tutorials.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thebe::comm::comm_channel::CommMsg;
use thebe::comm::tutorials_comm::RunTutorialParams;
use thebe::comm::tutorials_comm::TutorialsBackendEvent;
use thebe::comm::tutorials_comm::TutorialsFrontendEvent;
use thebe::socket::comm::CommInitiator;
use thebe::socket::comm::CommSocket;
use tutor::executor::ExecuteError;
use tutor::executor::FallbackExecutor;
use tutor::fixtures::FakeExecutor;
use tutor::fixtures::FakeFileSystem;
use tutor::sentinel::PollSettings;
use tutor::storage::Storage;
use tutor::tutorials::ServiceTimings;
use tutor::tutorials::TutorialsService;

/// Short waits so failure paths don't slow the suite down.
fn test_timings() -> ServiceTimings {
    ServiceTimings {
        session_refresh: PollSettings::new(Duration::from_millis(300), Duration::from_millis(25)),
        session_run: PollSettings::new(Duration::from_millis(300), Duration::from_millis(25)),
        listing: PollSettings::new(Duration::from_millis(500), Duration::from_millis(25)),
        launch: PollSettings::new(Duration::from_millis(500), Duration::from_millis(25)),
    }
}

fn tutorials_comm() -> CommSocket {
    CommSocket::new(
        CommInitiator::FrontEnd,
        String::from("test-tutorials-comm-id"),
        String::from("tutorials"),
    )
}

fn storage() -> Storage {
    Storage::new(PathBuf::from("/data"))
}

fn start_service(executor: FakeExecutor, fs: FakeFileSystem) -> CommSocket {
    let comm = tutorials_comm();
    TutorialsService::start_with_timings(
        comm.clone(),
        FallbackExecutor::new(executor),
        Arc::new(fs),
        storage(),
        test_timings(),
    );
    comm
}

fn send_event(comm: &CommSocket, event: TutorialsBackendEvent) {
    comm.incoming_tx
        .send(CommMsg::Data(serde_json::to_value(event).unwrap()))
        .unwrap();
}

fn recv_event(comm: &CommSocket) -> TutorialsFrontendEvent {
    let msg = comm
        .outgoing_rx
        .recv_timeout(Duration::from_secs(5))
        .unwrap();
    match msg {
        CommMsg::Data(data) => serde_json::from_value(data).unwrap(),
        _ => panic!("Expected a data message, got {msg:?}"),
    }
}

fn assert_status(event: TutorialsFrontendEvent, expected: &str) {
    match event {
        TutorialsFrontendEvent::Status(params) => assert_eq!(params.message, expected),
        other => panic!("Expected a status event, got {other:?}"),
    }
}

#[test]
fn test_refresh_sends_listing() {
    let fs = FakeFileSystem::new();
    let listing_path = storage().listing();

    // Sourcing the listing script "runs" it by writing the listing file,
    // stamped over any stale one
    fs.put(&listing_path, r#"[{ "package": "old", "name": "old" }]"#);
    let executor = FakeExecutor::with_handler({
        let fs = fs.clone();
        let listing_path = listing_path.clone();
        move |request| {
            if request.code.starts_with("source(") {
                fs.put(
                    &listing_path,
                    r#"[{ "package": "learnr", "name": "hello", "title": "Hello, Tutorial!" }]"#,
                );
            }
            Ok(())
        }
    });

    let comm = start_service(executor.clone(), fs.clone());
    send_event(&comm, TutorialsBackendEvent::Refresh);

    assert_status(recv_event(&comm), "Waiting for R session...");
    match recv_event(&comm) {
        TutorialsFrontendEvent::Data(params) => {
            assert_eq!(params.error, None);
            assert_eq!(params.rows.len(), 1);
            assert_eq!(params.rows[0].package, "learnr");
            assert_eq!(params.rows[0].name, "hello");
            assert_eq!(params.rows[0].title.as_deref(), Some("Hello, Tutorial!"));
        },
        other => panic!("Expected a data event, got {other:?}"),
    }

    // The stale listing was dropped before the script ran
    assert!(fs.removals().contains(&listing_path));

    // The script landed on disk and was sourced with forward slashes
    let script = fs.contents(&storage().listing_script()).unwrap();
    assert!(script.contains("learnr::available_tutorials"));
    let source = executor
        .requests()
        .into_iter()
        .find(|request| request.code.starts_with("source("))
        .unwrap();
    assert!(source.code.contains("/data/write-tutorials.R"));
}

#[test]
fn test_ready_requests_initial_listing() {
    let executor = FakeExecutor::with_handler(|_| {
        Err(ExecuteError::Rejected {
            message: String::from("no session"),
        })
    });
    let comm = start_service(executor, FakeFileSystem::new());

    send_event(&comm, TutorialsBackendEvent::Ready);

    assert_status(recv_event(&comm), "Waiting for R session...");
    match recv_event(&comm) {
        TutorialsFrontendEvent::Data(params) => {
            assert!(params.rows.is_empty());
            assert_eq!(
                params.error.as_deref(),
                Some("R session is not running. Start R, then click Refresh.")
            );
        },
        other => panic!("Expected a data event, got {other:?}"),
    }
}

#[test]
fn test_refresh_reports_listing_timeout() {
    // The session answers but nothing ever writes the listing file
    let comm = start_service(FakeExecutor::accepting(), FakeFileSystem::new());

    send_event(&comm, TutorialsBackendEvent::Refresh);

    assert_status(recv_event(&comm), "Waiting for R session...");
    match recv_event(&comm) {
        TutorialsFrontendEvent::Data(params) => {
            assert_eq!(
                params.error.as_deref(),
                Some("Timed out waiting for tutorials.json to be written.")
            );
        },
        other => panic!("Expected a data event, got {other:?}"),
    }
}

#[test]
fn test_refresh_surfaces_r_side_error() {
    let fs = FakeFileSystem::new();
    let listing_path = storage().listing();

    let executor = FakeExecutor::with_handler({
        let fs = fs.clone();
        move |request| {
            if request.code.starts_with("source(") {
                fs.put(&listing_path, r#"{ "error": "learnr is not installed" }"#);
            }
            Ok(())
        }
    });

    let comm = start_service(executor, fs);
    send_event(&comm, TutorialsBackendEvent::Refresh);

    assert_status(recv_event(&comm), "Waiting for R session...");
    match recv_event(&comm) {
        TutorialsFrontendEvent::Data(params) => {
            assert!(params.rows.is_empty());
            assert_eq!(params.error.as_deref(), Some("learnr is not installed"));
        },
        other => panic!("Expected a data event, got {other:?}"),
    }
}

#[test]
fn test_run_reports_launch_url() {
    let fs = FakeFileSystem::new();
    let url_path = storage().launch_url();
    fs.put(&url_path, "http://old:1/stale");

    let executor = FakeExecutor::with_handler({
        let fs = fs.clone();
        let url_path = url_path.clone();
        move |request| {
            if request.code.contains("learnr::run_tutorial") {
                fs.put(&url_path, "http://127.0.0.1:7123/");
            }
            Ok(())
        }
    });

    let comm = start_service(executor.clone(), fs.clone());
    send_event(
        &comm,
        TutorialsBackendEvent::Run(RunTutorialParams {
            name: String::from("hello"),
            pkg: String::from("learnr"),
        }),
    );

    assert_status(recv_event(&comm), "Launching tutorial...");
    match recv_event(&comm) {
        TutorialsFrontendEvent::Launched(params) => {
            assert_eq!(params.url, "http://127.0.0.1:7123/");
        },
        other => panic!("Expected a launched event, got {other:?}"),
    }
    assert_status(recv_event(&comm), "");

    // The stale URL file was dropped before the launch was submitted
    assert!(fs.removals().contains(&url_path));

    let launch = executor
        .requests()
        .into_iter()
        .find(|request| request.code.contains("learnr::run_tutorial"))
        .unwrap();
    assert!(launch.code.contains(r#""hello""#));
    assert!(launch.code.contains(r#"package = "learnr""#));
}

#[test]
fn test_run_rejects_blank_parameters() {
    let executor = FakeExecutor::accepting();
    let comm = start_service(executor.clone(), FakeFileSystem::new());

    send_event(
        &comm,
        TutorialsBackendEvent::Run(RunTutorialParams {
            name: String::from("   "),
            pkg: String::from("learnr"),
        }),
    );

    match recv_event(&comm) {
        TutorialsFrontendEvent::Error(params) => {
            assert_eq!(params.message, "A tutorial name and package are required.");
        },
        other => panic!("Expected an error event, got {other:?}"),
    }

    // Rejected before anything was submitted to the session
    assert!(executor.requests().is_empty());
}

#[test]
fn test_run_reports_session_down() {
    let executor = FakeExecutor::with_handler(|_| Err(ExecuteError::NoReply));
    let comm = start_service(executor, FakeFileSystem::new());

    send_event(
        &comm,
        TutorialsBackendEvent::Run(RunTutorialParams {
            name: String::from("hello"),
            pkg: String::from("learnr"),
        }),
    );

    assert_status(recv_event(&comm), "Launching tutorial...");
    match recv_event(&comm) {
        TutorialsFrontendEvent::Error(params) => {
            assert_eq!(
                params.message,
                "R session is not running. Start R, then click Refresh."
            );
        },
        other => panic!("Expected an error event, got {other:?}"),
    }
    assert_status(recv_event(&comm), "");
}

#[test]
fn test_run_timeout_points_at_manual_recovery() {
    // The launch is accepted but no URL ever appears
    let comm = start_service(FakeExecutor::accepting(), FakeFileSystem::new());

    send_event(
        &comm,
        TutorialsBackendEvent::Run(RunTutorialParams {
            name: String::from("hello"),
            pkg: String::from("learnr"),
        }),
    );

    assert_status(recv_event(&comm), "Launching tutorial...");
    match recv_event(&comm) {
        TutorialsFrontendEvent::Error(params) => {
            assert_eq!(
                params.message,
                "Tutorial launched. If no browser opened, check the R Console or click Refresh and Run again."
            );
        },
        other => panic!("Expected an error event, got {other:?}"),
    }
    assert_status(recv_event(&comm), "");
}

#[test]
fn test_run_rejects_invalid_url() {
    let fs = FakeFileSystem::new();
    let url_path = storage().launch_url();

    let executor = FakeExecutor::with_handler({
        let fs = fs.clone();
        move |request| {
            if request.code.contains("learnr::run_tutorial") {
                fs.put(&url_path, "shiny exploded before listening");
            }
            Ok(())
        }
    });

    let comm = start_service(executor, fs);
    send_event(
        &comm,
        TutorialsBackendEvent::Run(RunTutorialParams {
            name: String::from("hello"),
            pkg: String::from("learnr"),
        }),
    );

    assert_status(recv_event(&comm), "Launching tutorial...");
    match recv_event(&comm) {
        TutorialsFrontendEvent::Error(params) => {
            assert!(params.message.starts_with("Tutorial reported an invalid URL"));
        },
        other => panic!("Expected an error event, got {other:?}"),
    }
    assert_status(recv_event(&comm), "");
}

#[test]
fn test_unknown_events_are_ignored() {
    let executor = FakeExecutor::with_handler(|_| Err(ExecuteError::NoReply));
    let comm = start_service(executor, FakeFileSystem::new());

    comm.incoming_tx
        .send(CommMsg::Data(serde_json::json!({ "type": "mystery" })))
        .unwrap();

    // The service shrugged it off and still serves real events
    send_event(&comm, TutorialsBackendEvent::Refresh);
    assert_status(recv_event(&comm), "Waiting for R session...");
}

#[test]
fn test_close_cancels_launch_watcher() {
    let comm = tutorials_comm();
    let mut timings = test_timings();
    timings.launch = PollSettings::new(Duration::from_secs(60), Duration::from_millis(25));

    let handle = TutorialsService::start_with_timings(
        comm.clone(),
        FallbackExecutor::new(FakeExecutor::accepting()),
        Arc::new(FakeFileSystem::new()),
        storage(),
        timings,
    );

    send_event(
        &comm,
        TutorialsBackendEvent::Run(RunTutorialParams {
            name: String::from("hello"),
            pkg: String::from("learnr"),
        }),
    );
    assert_status(recv_event(&comm), "Launching tutorial...");

    comm.incoming_tx.send(CommMsg::Close).unwrap();
    handle.join().unwrap();

    // The watcher went down with the comm instead of running out its budget
    let quiet = comm.outgoing_rx.recv_timeout(Duration::from_millis(300));
    assert!(quiet.is_err());
}
