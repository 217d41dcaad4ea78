//
// fixtures/mod.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

//! Test utilities for tutor's unit and integration tests.

mod utils;

pub use utils::*;
