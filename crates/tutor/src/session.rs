//
// session.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

use std::time::Instant;

use crate::executor::FallbackExecutor;
use crate::executor::RuntimeExecutor;
use crate::sentinel::PollSettings;

/// The probe submitted to check that the session accepts code.
const SESSION_PING: &str = "invisible(TRUE)";

/// Wait until the R session accepts a trivial submission.
///
/// Same deadline discipline as the sentinel waits, probing the runtime
/// instead of a file. Returns `false` when the deadline passes without a
/// successful submission.
pub fn wait_for_session<E>(executor: &FallbackExecutor<E>, settings: PollSettings) -> bool
where
    E: RuntimeExecutor,
{
    let deadline = Instant::now() + settings.timeout;

    loop {
        if executor.execute_r(SESSION_PING).is_ok() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(settings.interval);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::executor::ExecuteError;
    use crate::fixtures::FakeExecutor;

    fn settings(timeout_ms: u64, interval_ms: u64) -> PollSettings {
        PollSettings::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(interval_ms),
        )
    }

    #[test]
    fn test_ready_session_answers_first_ping() {
        let executor = FakeExecutor::accepting();
        let fallback = FallbackExecutor::new(executor.clone());

        assert!(wait_for_session(&fallback, settings(1000, 100)));

        let requests = executor.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].code, "invisible(TRUE)");
    }

    #[test]
    fn test_down_session_times_out() {
        let executor = FakeExecutor::with_handler(|_| {
            Err(ExecuteError::NoReply)
        });
        let fallback = FallbackExecutor::new(executor);

        let start = Instant::now();
        let up = wait_for_session(&fallback, settings(200, 50));
        let elapsed = start.elapsed();

        assert!(!up);
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(500));
    }

    #[test]
    fn test_session_coming_up_mid_wait_is_noticed() {
        static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);
        let executor = FakeExecutor::with_handler(|_| {
            // Both modes of the first two pings fail, then the session is up
            if ATTEMPTS.fetch_add(1, Ordering::SeqCst) < 4 {
                Err(ExecuteError::NoReply)
            } else {
                Ok(())
            }
        });
        let fallback = FallbackExecutor::new(executor);

        assert!(wait_for_session(&fallback, settings(2000, 20)));
    }
}
