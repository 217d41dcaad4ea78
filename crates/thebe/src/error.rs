/*
 * error.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use std::fmt;

#[derive(Debug)]
pub enum Error {
    CannotSerialize(serde_json::Error),
    MalformedMessage(String, serde_json::Error),
    UnknownComm(String),
    ChannelClosed(String),
    ReplyTimedOut(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::CannotSerialize(err) => Some(err),
            Error::MalformedMessage(_, err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::CannotSerialize(err) => {
                write!(f, "Cannot serialize message: {}", err)
            },
            Error::MalformedMessage(line, err) => {
                write!(f, "Malformed wire message: {} (raw: {})", err, line)
            },
            Error::UnknownComm(name) => {
                write!(f, "No comm registered under the name '{}'", name)
            },
            Error::ChannelClosed(comm) => {
                write!(f, "The channel for comm '{}' is closed", comm)
            },
            Error::ReplyTimedOut(id) => {
                write!(f, "Timed out waiting for a reply to request '{}'", id)
            },
        }
    }
}
