/*
 * runtime_comm.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;

/// Possible values for Mode in ExecuteCode. `NonInteractive` runs the code
/// without echoing it in the Console; `Interactive` runs it as if the user
/// had typed it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub enum ExecutionMode {
    NonInteractive,
    Interactive,
}

/// Parameters for the ExecuteCode method.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExecuteCodeParams {
    /// The language of the code to execute.
    pub language_id: String,

    /// The code to execute.
    pub code: String,

    /// Whether to focus the Console when the code runs.
    pub focus: bool,

    /// Whether the code must be a complete expression to be accepted.
    pub require_complete: bool,

    /// How visibly to execute the code.
    pub mode: ExecutionMode,
}

/**
 * Frontend RPC request types for the runtime comm. These are requests made BY
 * the back end and answered by the frontend, which owns the live runtime
 * session.
 */
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", content = "params")]
pub enum RuntimeFrontendRequest {
    /// Submit code to the runtime session.
    #[serde(rename = "execute_code")]
    ExecuteCode(ExecuteCodeParams),
}

/**
 * Frontend RPC Reply types for the runtime comm
 */
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", content = "result")]
pub enum RuntimeFrontendReply {
    /// Whether the runtime accepted the code. Acceptance means the code was
    /// submitted, not that all of its effects have completed.
    ExecuteCodeReply(bool),
}
