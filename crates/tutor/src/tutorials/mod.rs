//
// mod.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

pub mod listing;
pub mod service;

pub use service::ServiceTimings;
pub use service::TutorialsService;
