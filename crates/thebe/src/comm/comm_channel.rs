/*
 * comm_channel.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use serde_json::Value;
use strum_macros::Display;
use strum_macros::EnumString;

#[derive(Clone, Debug, Display, EnumString, PartialEq)]
#[strum(serialize_all = "camelCase")]
pub enum Comm {
    /// The tutorials pane.
    Tutorials,

    /// The bridge to the host's code execution API.
    Runtime,

    /// Some other comm with a custom name.
    #[strum(default)]
    Other(String),
}

#[derive(Clone, Debug)]
pub enum CommMsg {
    /// A message that is part of a Remote Procedure Call (RPC). The first value
    /// is the unique ID of the RPC invocation, and the second value is the data
    /// associated with the RPC (the request or response).
    Rpc(String, Value),

    /// A message representing any other data sent on the comm channel; usually
    /// used for events.
    Data(Value),

    // A message indicating that the comm channel should be closed.
    Close,
}
