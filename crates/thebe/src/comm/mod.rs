/*
 * mod.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

pub mod comm_channel;
pub mod rpc;
pub mod runtime_comm;
pub mod tutorials_comm;
