//
// storage.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

use std::path::Path;
use std::path::PathBuf;

use anyhow::anyhow;

use crate::fs::FileSystem;

/// The backend's storage directory and its well-known files.
///
/// Sentinel files and generated scripts live here and nowhere else. The
/// directory contents are disposable; every refresh and launch rewrites what
/// it needs.
#[derive(Clone, Debug)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The default root, a `tutor` subdirectory of the platform data
    /// directory.
    pub fn default_root() -> anyhow::Result<PathBuf> {
        let data = dirs::data_dir().ok_or(anyhow!("can't determine the user data directory"))?;
        Ok(data.join("tutor"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The tutorials listing sentinel, written by `list_tutorials.R`.
    pub fn listing(&self) -> PathBuf {
        self.root.join("tutorials.json")
    }

    /// The temp path the listing is written to before the rename.
    pub fn listing_tmp(&self) -> PathBuf {
        self.root.join("tutorials.tmp.json")
    }

    /// The launch-URL sentinel, written by `run_tutorial.R`.
    pub fn launch_url(&self) -> PathBuf {
        self.root.join("launch-url.txt")
    }

    /// Where the listing script is written before being `source()`d.
    pub fn listing_script(&self) -> PathBuf {
        self.root.join("write-tutorials.R")
    }

    /// Create the storage directory if it doesn't exist yet.
    pub fn ensure<F>(&self, fs: &F) -> std::io::Result<()>
    where
        F: FileSystem + ?Sized,
    {
        fs.create_dir_all(&self.root)
    }
}
