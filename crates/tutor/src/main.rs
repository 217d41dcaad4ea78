//
// main.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

use std::path::PathBuf;
use std::sync::Arc;

use thebe::comm::comm_channel::Comm;
use thebe::socket::comm::CommInitiator;
use thebe::socket::comm::CommSocket;
use tutor::executor::FallbackExecutor;
use tutor::executor::HostExecutor;
use tutor::fs::LocalFileSystem;
use tutor::logger;
use tutor::storage::Storage;
use tutor::transport::Transport;
use tutor::tutorials::TutorialsService;
use uuid::Uuid;

fn start_backend(storage_dir: Option<String>) -> anyhow::Result<()> {
    let root = match storage_dir {
        Some(dir) => PathBuf::from(dir),
        None => Storage::default_root()?,
    };
    let storage = Storage::new(root);
    log::info!("Exchanging tutorial files under {:?}", storage.root());

    let tutorials_comm = CommSocket::new(
        CommInitiator::FrontEnd,
        Uuid::new_v4().to_string(),
        Comm::Tutorials.to_string(),
    );
    let runtime_comm = CommSocket::new(
        CommInitiator::BackEnd,
        Uuid::new_v4().to_string(),
        Comm::Runtime.to_string(),
    );

    let executor = FallbackExecutor::new(HostExecutor::new(runtime_comm.clone()));
    let service = TutorialsService::start(
        tutorials_comm.clone(),
        executor,
        Arc::new(LocalFileSystem),
        storage,
    );

    let transport = Transport::start(vec![tutorials_comm, runtime_comm]);

    // Shutdown order: end of stdin stops the reader, which closes the comms;
    // the service then drops its sockets, which lets the writer drain and exit
    let _ = transport.read_handle.join();
    let _ = service.join();
    let _ = transport.write_handle.join();

    Ok(())
}

fn print_usage() {
    println!(
        "Tutor {}, the Positron tutorial backend.",
        env!("CARGO_PKG_VERSION")
    );
    println!(
        r#"
Usage: tutor [OPTIONS]

Available options:

--storage-dir DIR        Exchange tutorial files with R under the given
                         directory (defaults to a per-user data directory)
--log FILE               Log to the given file (if not specified, stderr
                         will be used; stdout carries the transport)
--version                Print the version of Tutor
--help                   Print this help message
"#
    );
}

fn main() {
    // Get an iterator over all the command-line arguments
    let mut argv = std::env::args();

    // Skip the first "argument" as it's the path/name to this executable
    argv.next();

    let mut storage_dir: Option<String> = None;
    let mut log_file: Option<String> = None;

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--storage-dir" => {
                if let Some(dir) = argv.next() {
                    storage_dir = Some(dir);
                } else {
                    eprintln!("A directory must be specified with the --storage-dir argument.");
                    return;
                }
            },
            "--log" => {
                if let Some(file) = argv.next() {
                    log_file = Some(file);
                } else {
                    eprintln!("A log file must be specified with the --log argument.");
                    return;
                }
            },
            "--version" => {
                println!("Tutor {}", env!("CARGO_PKG_VERSION"));
                return;
            },
            "--help" => {
                print_usage();
                return;
            },
            other => {
                eprintln!("Argument '{}' unknown", other);
                print_usage();
                return;
            },
        }
    }

    // Initialize the logger.
    logger::initialize(log_file.as_deref());

    // This causes panics on background threads to propagate on the main
    // thread. If we don't propagate a background thread panic, the program
    // keeps running in an unstable state as all communications with this
    // thread will error out or panic.
    // https://stackoverflow.com/questions/35988775/how-can-i-cause-a-panic-on-a-thread-to-immediately-end-the-main-thread
    let old_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let info = panic_info.payload();

        let loc = if let Some(location) = panic_info.location() {
            format!("In file '{}' at line {}:", location.file(), location.line(),)
        } else {
            String::from("No location information:")
        };

        if let Some(info) = info.downcast_ref::<&str>() {
            log::error!("Panic! {loc} {info:}");
        } else if let Some(info) = info.downcast_ref::<String>() {
            log::error!("Panic! {loc} {info:}");
        } else {
            log::error!("Panic! {loc} No contextual information.");
        }

        // Give some time to flush log
        log::logger().flush();
        std::thread::sleep(std::time::Duration::from_millis(250));

        old_hook(panic_info);
        std::process::abort();
    }));

    if let Err(err) = start_backend(storage_dir) {
        log::error!("Can't start the tutorial backend: {err:?}");
    }
}
