//
// listing.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

use anyhow::bail;
use serde_json::Value;
use thebe::comm::tutorials_comm::TutorialRow;

/// A parsed tutorial listing, as read back from the listing file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Listing {
    pub rows: Vec<TutorialRow>,

    /// The R-side failure that prevented collecting rows, if any.
    pub error: Option<String>,
}

impl Listing {
    pub fn failed(message: String) -> Self {
        Self {
            rows: vec![],
            error: Some(message),
        }
    }
}

/// Parses the content of the listing file.
///
/// The listing script writes either a plain array of rows, or an object with
/// an `error` string when collection failed in R. An object with a `rows`
/// array is accepted too. Anything else is rejected.
pub fn parse_listing(content: &str) -> anyhow::Result<Listing> {
    let value: Value = serde_json::from_str(content)?;

    // An error report wins over any rows that might also be present
    if let Some(error) = value.get("error").filter(|error| !error.is_null()) {
        let message = match error {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        };
        return Ok(Listing::failed(message));
    }

    let rows = if value.is_array() {
        value
    } else if let Some(rows) = value.get("rows") {
        rows.clone()
    } else {
        bail!("Unexpected listing shape: {value}");
    };

    Ok(Listing {
        rows: serde_json::from_value(rows)?,
        error: None,
    })
}
