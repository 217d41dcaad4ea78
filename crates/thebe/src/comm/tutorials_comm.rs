/*
 * tutorials_comm.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;

/**
 * Events sent by the tutorials pane to the back end. These use the pane's
 * webview protocol: messages are tagged with a `type` field and carry their
 * payload fields inline.
 */
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TutorialsBackendEvent {
    /// The pane finished loading and wants the initial listing.
    Ready,

    /// The user asked for the listing to be rebuilt.
    Refresh,

    /// The user asked for a tutorial to be launched.
    Run(RunTutorialParams),
}

/**
 * Events sent by the back end to the tutorials pane.
 */
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TutorialsFrontendEvent {
    /// Update the pane's transient status line. An empty message clears it.
    Status(StatusParams),

    /// Deliver the tutorial listing, or the error that prevented building it.
    Data(ListingParams),

    /// A launched tutorial reported the URL it is being served at.
    Launched(LaunchedParams),

    /// An operation failed; the message is shown in the pane.
    Error(ErrorParams),
}

/// Parameters for the Run event.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunTutorialParams {
    /// The tutorial's name within its package.
    pub name: String,

    /// The package the tutorial ships in.
    pub pkg: String,
}

/// Parameters for the Status event.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusParams {
    pub message: String,
}

/// Parameters for the Data event.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ListingParams {
    /// The available tutorials. Empty when an error is reported.
    pub rows: Vec<TutorialRow>,

    /// Why the listing could not be built, when it could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Parameters for the Launched event.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LaunchedParams {
    pub url: String,
}

/// Parameters for the Error event.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorParams {
    pub message: String,
}

/// One row of the tutorial listing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TutorialRow {
    /// The package the tutorial ships in.
    pub package: String,

    /// The tutorial's name within the package.
    pub name: String,

    /// The tutorial's display title, when the package declares one.
    pub title: Option<String>,
}

/**
 * Backend RPC request types for the tutorials comm
 */
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", content = "params")]
pub enum TutorialsBackendRequest {
    /// Insert exercise boilerplate of the given kind into the active document.
    #[serde(rename = "insert_exercise")]
    InsertExercise(InsertExerciseParams),

    /// List the exercise kinds the back end can insert.
    #[serde(rename = "exercise_kinds")]
    ExerciseKinds,
}

/**
 * Backend RPC Reply types for the tutorials comm
 */
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", content = "result")]
pub enum TutorialsBackendReply {
    /// The exercise script was submitted to the runtime.
    InsertExerciseReply(bool),

    /// The exercise kind catalog.
    ExerciseKindsReply(Vec<ExerciseKindInfo>),
}

/// Parameters for the InsertExercise method.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InsertExerciseParams {
    pub kind: ExerciseKind,
}

/// The exercise chunk kinds `tutorial.helpers::make_exercise()` understands.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub enum ExerciseKind {
    #[serde(rename = "code")]
    Code,

    #[serde(rename = "no-answer")]
    NoAnswer,

    #[serde(rename = "yes-answer")]
    YesAnswer,
}

impl ExerciseKind {
    /// The argument string `make_exercise()` expects for this kind.
    pub fn argument(&self) -> &'static str {
        match self {
            ExerciseKind::Code => "code",
            ExerciseKind::NoAnswer => "no-answer",
            ExerciseKind::YesAnswer => "yes-answer",
        }
    }

    /// The label shown in the host's exercise picker.
    pub fn label(&self) -> &'static str {
        match self {
            ExerciseKind::Code => "Code Exercise",
            ExerciseKind::NoAnswer => "No-Answer Exercise",
            ExerciseKind::YesAnswer => "Yes-Answer Exercise",
        }
    }

    pub fn all() -> &'static [ExerciseKind] {
        &[
            ExerciseKind::Code,
            ExerciseKind::NoAnswer,
            ExerciseKind::YesAnswer,
        ]
    }
}

/// One entry of the exercise kind catalog.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseKindInfo {
    pub kind: ExerciseKind,
    pub label: String,
}
