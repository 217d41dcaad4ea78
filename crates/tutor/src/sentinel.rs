//
// sentinel.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use crate::fs::FileSystem;

/// Outcome of waiting on a sentinel file.
#[derive(Clone, Debug, PartialEq)]
pub enum AwaitResult {
    /// The file became non-empty. Carries the content with surrounding
    /// whitespace trimmed.
    Ready(String),

    /// The deadline passed without the file becoming non-empty.
    TimedOut,

    /// The wait was cancelled before the file became non-empty.
    Cancelled,
}

/// Timing budget for a sentinel wait.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollSettings {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollSettings {
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Cloneable cancellation flag shared between a waiter and its owner.
///
/// Cancelling is one-way. A token is only consulted between read attempts, so
/// cancellation is observed within one poll interval.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Poll `path` until it holds non-whitespace content, the timeout passes, or
/// the token is cancelled.
///
/// The first read happens before any deadline or cancellation check, so a
/// zero timeout still gets exactly one attempt and a file that is already
/// populated wins even against an already-cancelled token. Read failures of
/// any kind (missing file, permission errors, partial writes) are treated as
/// "not yet" and retried; the target is never written or removed here.
///
/// The producer of the file is elsewhere (an R script writing a sentinel), so
/// there is nothing to await on. Waiters are stateless and independent;
/// concurrent waits on the same path are fine.
pub fn wait_for_content<F>(
    fs: &F,
    path: &Path,
    settings: PollSettings,
    cancel: &CancelToken,
) -> AwaitResult
where
    F: FileSystem + ?Sized,
{
    let deadline = Instant::now() + settings.timeout;

    loop {
        if let Ok(content) = fs.read_to_string(path) {
            let content = content.trim();
            if !content.is_empty() {
                return AwaitResult::Ready(content.to_string());
            }
        }

        if cancel.is_cancelled() {
            return AwaitResult::Cancelled;
        }
        if Instant::now() >= deadline {
            return AwaitResult::TimedOut;
        }

        std::thread::sleep(settings.interval);
    }
}
