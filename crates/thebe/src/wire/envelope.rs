/*
 * envelope.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::comm::comm_channel::CommMsg;

/**
 * A single message on the line-delimited stdio transport. Each line is one
 * JSON object naming the comm it belongs to and carrying one comm message.
 */
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WireMessage {
    /// The name of the comm this message belongs to.
    pub comm: String,

    #[serde(flatten)]
    pub payload: WirePayload,
}

/// The comm message carried by a `WireMessage`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WirePayload {
    /// A freeform data message, usually an event.
    Data { content: Value },

    /// An RPC request or response, under the invocation's unique ID.
    Rpc { id: String, content: Value },

    /// The comm is being closed.
    Close,
}

impl WireMessage {
    /// Wrap a comm message for the wire.
    pub fn from_comm_msg(comm: String, msg: CommMsg) -> Self {
        let payload = match msg {
            CommMsg::Data(content) => WirePayload::Data { content },
            CommMsg::Rpc(id, content) => WirePayload::Rpc { id, content },
            CommMsg::Close => WirePayload::Close,
        };
        Self { comm, payload }
    }

    /// Unwrap the comm message carried by this envelope.
    pub fn into_comm_msg(self) -> CommMsg {
        match self.payload {
            WirePayload::Data { content } => CommMsg::Data(content),
            WirePayload::Rpc { id, content } => CommMsg::Rpc(id, content),
            WirePayload::Close => CommMsg::Close,
        }
    }

    /// Parse one line of the transport.
    pub fn from_line(line: &str) -> crate::Result<Self> {
        serde_json::from_str(line)
            .map_err(|err| crate::Error::MalformedMessage(line.to_string(), err))
    }

    /// Render this message as one line of the transport. The result contains
    /// no newline.
    pub fn to_line(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(crate::Error::CannotSerialize)
    }
}
