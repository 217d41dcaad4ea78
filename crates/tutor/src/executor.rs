//
// executor.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

use std::time::Duration;

use thebe::comm::rpc::rpc_error_message;
use thebe::comm::runtime_comm::RuntimeFrontendReply;
use thebe::comm::runtime_comm::RuntimeFrontendRequest;
use thebe::socket::comm::CommSocket;

pub use thebe::comm::runtime_comm::ExecuteCodeParams as ExecuteRequest;
pub use thebe::comm::runtime_comm::ExecutionMode;

/// How long to wait for the host to acknowledge an `execute_code` request.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// A request to run R code quietly: no console focus, complete statements
/// only.
pub fn r_request(code: impl Into<String>, mode: ExecutionMode) -> ExecuteRequest {
    ExecuteRequest {
        language_id: String::from("r"),
        code: code.into(),
        focus: false,
        require_complete: true,
        mode,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExecuteError {
    /// The host refused the request or reported a failure.
    Rejected { message: String },

    /// The host didn't reply within the reply window.
    NoReply,

    /// The comm to the host is gone.
    Disconnected,
}

impl std::fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecuteError::Rejected { message } => write!(f, "Execution rejected: {message}"),
            ExecuteError::NoReply => write!(f, "No reply from the host runtime"),
            ExecuteError::Disconnected => write!(f, "Runtime comm disconnected"),
        }
    }
}

impl std::error::Error for ExecuteError {}

/// Submits code to the host runtime.
///
/// `Ok` means the host accepted the code for execution, not that its side
/// effects have completed. Work that outlives the submission (a tutorial's
/// Shiny app) reports back through sentinel files instead.
pub trait RuntimeExecutor: Send + Sync {
    fn execute(&self, request: &ExecuteRequest) -> Result<(), ExecuteError>;
}

/// The production executor: sends `execute_code` RPCs over the runtime comm
/// and reads the host's reply.
pub struct HostExecutor {
    comm: CommSocket,
    reply_timeout: Duration,
}

impl HostExecutor {
    pub fn new(comm: CommSocket) -> Self {
        Self::with_reply_timeout(comm, DEFAULT_REPLY_TIMEOUT)
    }

    pub fn with_reply_timeout(comm: CommSocket, reply_timeout: Duration) -> Self {
        Self {
            comm,
            reply_timeout,
        }
    }
}

impl RuntimeExecutor for HostExecutor {
    fn execute(&self, request: &ExecuteRequest) -> Result<(), ExecuteError> {
        let request = RuntimeFrontendRequest::ExecuteCode(request.clone());

        let reply = match self.comm.rpc(request, self.reply_timeout) {
            Ok(reply) => reply,
            Err(thebe::Error::ReplyTimedOut(_)) => return Err(ExecuteError::NoReply),
            Err(_) => return Err(ExecuteError::Disconnected),
        };

        if let Some(message) = rpc_error_message(&reply) {
            return Err(ExecuteError::Rejected { message });
        }

        match serde_json::from_value::<RuntimeFrontendReply>(reply) {
            Ok(RuntimeFrontendReply::ExecuteCodeReply(true)) => Ok(()),
            Ok(RuntimeFrontendReply::ExecuteCodeReply(false)) => Err(ExecuteError::Rejected {
                message: String::from("The host declined to execute the code."),
            }),
            Err(err) => Err(ExecuteError::Rejected {
                message: format!("Unexpected reply from the host: {err}"),
            }),
        }
    }
}

/// Mode fallback as an ordered strategy list.
///
/// Tries `NonInteractive` first to keep quiet work out of the console, then
/// `Interactive` for hosts that don't support the former. The first success
/// wins; when every mode fails, the last error is reported.
pub struct FallbackExecutor<E> {
    executor: E,
    modes: Vec<ExecutionMode>,
}

impl<E: RuntimeExecutor> FallbackExecutor<E> {
    pub fn new(executor: E) -> Self {
        Self::with_modes(executor, vec![
            ExecutionMode::NonInteractive,
            ExecutionMode::Interactive,
        ])
    }

    pub fn with_modes(executor: E, modes: Vec<ExecutionMode>) -> Self {
        Self { executor, modes }
    }

    pub fn execute_r(&self, code: &str) -> Result<(), ExecuteError> {
        let mut last = ExecuteError::Rejected {
            message: String::from("No execution modes configured."),
        };

        for mode in &self.modes {
            match self.executor.execute(&r_request(code, *mode)) {
                Ok(()) => return Ok(()),
                Err(err) => last = err,
            }
        }

        Err(last)
    }
}
