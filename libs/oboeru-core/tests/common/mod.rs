//! Shared setup for integration tests.
//!
//! Provides a throwaway vault directory backed by [`FsStore`] and a fixed
//! clock.

#![allow(dead_code)]

pub mod fixtures;

use chrono::{DateTime, TimeZone, Utc};
use oboeru_core::FsStore;
use std::path::PathBuf;
use tempfile::TempDir;

/// Temporary vault with an [`FsStore`] rooted in it.
pub struct TestVault {
    dir: TempDir,
    pub store: FsStore,
}

impl TestVault {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store = FsStore::new(dir.path());
        Self { dir, store }
    }

    /// Write a document, creating parent directories.
    pub fn write(&self, id: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, content).expect("failed to write document");
        path
    }

    pub fn read(&self, id: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(id)).expect("failed to read document")
    }
}

/// Fixed point in time the tests schedule against.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap()
}
