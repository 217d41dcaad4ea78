//
// lib.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

pub mod executor;
pub mod exercises;
pub mod fixtures;
pub mod fs;
pub mod logger;
pub mod scripts;
pub mod sentinel;
pub mod session;
pub mod storage;
pub mod strings;
pub mod transport;
pub mod tutorials;

/// Spawn a named thread and return its `JoinHandle`.
/// Panics if the OS refuses to spawn the thread.
#[macro_export]
macro_rules! spawn {
    ($name:expr, $body:expr) => {{
        std::thread::Builder::new()
            .name($name.into())
            .spawn($body)
            .unwrap()
    }};
}
