//
// service.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

use std::cell::Cell;
use std::io::ErrorKind;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use thebe::comm::comm_channel::CommMsg;
use thebe::comm::tutorials_comm::ErrorParams;
use thebe::comm::tutorials_comm::InsertExerciseParams;
use thebe::comm::tutorials_comm::LaunchedParams;
use thebe::comm::tutorials_comm::ListingParams;
use thebe::comm::tutorials_comm::RunTutorialParams;
use thebe::comm::tutorials_comm::StatusParams;
use thebe::comm::tutorials_comm::TutorialsBackendEvent;
use thebe::comm::tutorials_comm::TutorialsBackendReply;
use thebe::comm::tutorials_comm::TutorialsBackendRequest;
use thebe::comm::tutorials_comm::TutorialsFrontendEvent;
use thebe::socket::comm::CommSocket;

use crate::executor::FallbackExecutor;
use crate::executor::RuntimeExecutor;
use crate::exercises;
use crate::fs::FileSystem;
use crate::scripts;
use crate::sentinel;
use crate::sentinel::AwaitResult;
use crate::sentinel::CancelToken;
use crate::sentinel::PollSettings;
use crate::session;
use crate::storage::Storage;
use crate::tutorials::listing;
use crate::tutorials::listing::Listing;

const STATUS_WAITING_FOR_SESSION: &str = "Waiting for R session...";
const STATUS_LAUNCHING: &str = "Launching tutorial...";

const ERROR_SESSION_DOWN: &str = "R session is not running. Start R, then click Refresh.";
const ERROR_LISTING_TIMEOUT: &str = "Timed out waiting for tutorials.json to be written.";

/// Shiny may write the URL long after the wait gives up, so the timeout
/// message points at manual recovery rather than declaring failure.
const LAUNCH_TIMEOUT_GUIDANCE: &str =
    "Tutorial launched. If no browser opened, check the R Console or click Refresh and Run again.";

/// Wait budgets for the tutorial flows. Production uses `Default`; tests
/// inject much shorter ones.
#[derive(Clone, Copy, Debug)]
pub struct ServiceTimings {
    /// Session probe budget before building a listing.
    pub session_refresh: PollSettings,

    /// Session probe budget before launching a tutorial.
    pub session_run: PollSettings,

    /// Wait budget for the listing file.
    pub listing: PollSettings,

    /// Wait budget for the launch URL file. Generous because Shiny can take
    /// a while to boot on first run.
    pub launch: PollSettings,
}

impl Default for ServiceTimings {
    fn default() -> Self {
        Self {
            session_refresh: PollSettings::new(Duration::from_secs(20), Duration::from_millis(500)),
            session_run: PollSettings::new(Duration::from_secs(10), Duration::from_millis(400)),
            listing: PollSettings::new(Duration::from_secs(3), Duration::from_millis(100)),
            launch: PollSettings::new(Duration::from_secs(30), Duration::from_millis(200)),
        }
    }
}

/// The back end of the tutorials comm.
///
/// Owns the comm socket and serves the pane's events and requests from a
/// dedicated thread. Tutorial listings and launch URLs are relayed through
/// files the R scripts write; see the `sentinel` module.
pub struct TutorialsService<E, F> {
    comm: CommSocket,
    executor: FallbackExecutor<E>,
    fs: Arc<F>,
    storage: Storage,
    timings: ServiceTimings,
    cancel: CancelToken,
    closed: Cell<bool>,
}

impl<E, F> TutorialsService<E, F>
where
    E: RuntimeExecutor + 'static,
    F: FileSystem + 'static,
{
    /// Start the service on its own thread. The thread exits when the comm
    /// closes or its channel disconnects.
    pub fn start(
        comm: CommSocket,
        executor: FallbackExecutor<E>,
        fs: Arc<F>,
        storage: Storage,
    ) -> JoinHandle<()> {
        Self::start_with_timings(comm, executor, fs, storage, ServiceTimings::default())
    }

    pub fn start_with_timings(
        comm: CommSocket,
        executor: FallbackExecutor<E>,
        fs: Arc<F>,
        storage: Storage,
        timings: ServiceTimings,
    ) -> JoinHandle<()> {
        log::info!("Tutorials: Opening comm {}", comm.comm_id);

        let mut service = Self {
            comm,
            executor,
            fs,
            storage,
            timings,
            cancel: CancelToken::new(),
            closed: Cell::new(false),
        };
        crate::spawn!("tutor-tutorials", move || service.process_messages())
    }

    pub fn process_messages(&mut self) {
        loop {
            if self.closed.get() {
                break;
            }
            let Ok(msg) = self.comm.incoming_rx.recv() else {
                break;
            };

            log::trace!("Tutorials: Received message from front end: {msg:?}");

            match msg {
                CommMsg::Data(data) => {
                    let Ok(event) = serde_json::from_value::<TutorialsBackendEvent>(data.clone())
                    else {
                        log::warn!("Tutorials: Unknown message {data:?}");
                        continue;
                    };

                    if let Err(err) = self.handle_event(event) {
                        log::warn!("Tutorials: Error while handling event: {err:?}");
                    }
                },

                CommMsg::Rpc(..) => {
                    self.comm.handle_request(msg, |req| self.handle_rpc(req));
                },

                CommMsg::Close => {
                    log::trace!("Tutorials: Received a close message.");
                    break;
                },
            }
        }

        // Unblock any launch watcher still polling for a URL
        self.cancel.cancel();

        log::info!("Tutorials: Channel closed");
    }

    fn handle_event(&self, event: TutorialsBackendEvent) -> anyhow::Result<()> {
        match event {
            TutorialsBackendEvent::Ready | TutorialsBackendEvent::Refresh => self.refresh(),
            TutorialsBackendEvent::Run(params) => self.run(params),
        }
    }

    fn handle_rpc(&self, request: TutorialsBackendRequest) -> anyhow::Result<TutorialsBackendReply> {
        match request {
            TutorialsBackendRequest::InsertExercise(InsertExerciseParams { kind }) => {
                exercises::insert_exercise(&self.executor, kind)?;
                Ok(TutorialsBackendReply::InsertExerciseReply(true))
            },
            TutorialsBackendRequest::ExerciseKinds => Ok(TutorialsBackendReply::ExerciseKindsReply(
                exercises::exercise_kinds(),
            )),
        }
    }

    /// Rebuild the tutorial listing and send it to the front end.
    ///
    /// Failures travel in the listing's `error` field; a `data` event always
    /// goes out so the pane stops showing its spinner.
    fn refresh(&self) -> anyhow::Result<()> {
        self.send_status(STATUS_WAITING_FOR_SESSION)?;

        if !session::wait_for_session(&self.executor, self.timings.session_refresh) {
            return self.send_listing(Listing::failed(String::from(ERROR_SESSION_DOWN)));
        }

        let listing = match self.collect_listing() {
            Ok(listing) => listing,
            Err(err) => Listing::failed(format!("Failed to read tutorials file: {err}")),
        };
        self.send_listing(listing)
    }

    /// Run the listing script in R and read back the file it writes.
    fn collect_listing(&self) -> anyhow::Result<Listing> {
        let fs = &*self.fs;
        self.storage.ensure(fs)?;

        // A leftover listing from an earlier refresh must not be read back
        // as this one's output
        let listing_path = self.storage.listing();
        match fs.remove_file(&listing_path) {
            Ok(()) => {},
            Err(err) if err.kind() == ErrorKind::NotFound => {},
            Err(err) => log::warn!("Tutorials: Can't remove stale listing: {err}"),
        }

        let script = scripts::list_tutorials(&self.storage.listing_tmp(), &listing_path)?;
        let script_path = self.storage.listing_script();
        fs.write(&script_path, &script)?;

        self.executor
            .execute_r(&scripts::source_quietly(&script_path)?)?;

        match sentinel::wait_for_content(fs, &listing_path, self.timings.listing, &self.cancel) {
            AwaitResult::Ready(content) => listing::parse_listing(&content),
            AwaitResult::TimedOut => Ok(Listing::failed(String::from(ERROR_LISTING_TIMEOUT))),
            AwaitResult::Cancelled => Ok(Listing::default()),
        }
    }

    /// Launch a tutorial and watch for the URL it gets served at.
    fn run(&self, params: RunTutorialParams) -> anyhow::Result<()> {
        let name = params.name.trim();
        let pkg = params.pkg.trim();
        if name.is_empty() || pkg.is_empty() {
            return self.send_error(String::from("A tutorial name and package are required."));
        }

        self.send_status(STATUS_LAUNCHING)?;

        if !session::wait_for_session(&self.executor, self.timings.session_run) {
            self.send_error(String::from(ERROR_SESSION_DOWN))?;
            return self.send_status("");
        }

        if let Err(err) = self.submit_launch(name, pkg) {
            self.send_error(format!("Failed to launch tutorial: {err}"))?;
            return self.send_status("");
        }

        self.watch_launch();
        Ok(())
    }

    fn submit_launch(&self, name: &str, pkg: &str) -> anyhow::Result<()> {
        let fs = &*self.fs;
        self.storage.ensure(fs)?;

        // Same staleness rule as the listing file
        let url_path = self.storage.launch_url();
        match fs.remove_file(&url_path) {
            Ok(()) => {},
            Err(err) if err.kind() == ErrorKind::NotFound => {},
            Err(err) => log::warn!("Tutorials: Can't remove stale launch URL: {err}"),
        }

        let script = scripts::run_tutorial(&url_path, name, pkg)?;
        self.executor.execute_r(&script)?;
        Ok(())
    }

    /// Wait for the launch URL on a separate thread so the service keeps
    /// serving messages while Shiny boots.
    fn watch_launch(&self) {
        let fs = Arc::clone(&self.fs);
        let url_path = self.storage.launch_url();
        let settings = self.timings.launch;
        let cancel = self.cancel.clone();
        let outgoing_tx = self.comm.outgoing_tx.clone();

        crate::spawn!("tutor-tutorial-launch", move || {
            let event = match sentinel::wait_for_content(&*fs, &url_path, settings, &cancel) {
                AwaitResult::Ready(content) => match url::Url::parse(&content) {
                    // Forward the URL exactly as R wrote it
                    Ok(_) => TutorialsFrontendEvent::Launched(LaunchedParams { url: content }),
                    Err(err) => TutorialsFrontendEvent::Error(ErrorParams {
                        message: format!("Tutorial reported an invalid URL '{content}': {err}"),
                    }),
                },
                AwaitResult::TimedOut => TutorialsFrontendEvent::Error(ErrorParams {
                    message: String::from(LAUNCH_TIMEOUT_GUIDANCE),
                }),
                AwaitResult::Cancelled => return,
            };

            let clear = TutorialsFrontendEvent::Status(StatusParams {
                message: String::new(),
            });
            for message in [event, clear] {
                let Ok(data) = serde_json::to_value(message) else {
                    log::error!("Tutorials: Can't serialize launch event");
                    return;
                };
                if outgoing_tx.send(CommMsg::Data(data)).is_err() {
                    return;
                }
            }
        });
    }

    fn send_status(&self, message: &str) -> anyhow::Result<()> {
        self.send_event(TutorialsFrontendEvent::Status(StatusParams {
            message: String::from(message),
        }))
    }

    fn send_error(&self, message: String) -> anyhow::Result<()> {
        self.send_event(TutorialsFrontendEvent::Error(ErrorParams { message }))
    }

    fn send_listing(&self, listing: Listing) -> anyhow::Result<()> {
        self.send_event(TutorialsFrontendEvent::Data(ListingParams {
            rows: listing.rows,
            error: listing.error,
        }))
    }

    fn send_event(&self, message: TutorialsFrontendEvent) -> anyhow::Result<()> {
        let event = serde_json::to_value(message)?;

        if let Err(_) = self.comm.outgoing_tx.send(CommMsg::Data(event)) {
            self.closed.set(true);
        }

        Ok(())
    }
}
