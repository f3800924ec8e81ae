// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic single-file writes: write-to-temp, fsync, rename-over.
//!
//! Same sequence the checkpoint writer elsewhere in this codebase uses for
//! its snapshot blob, scaled down to one small record at a time instead of a
//! whole materialized state.

use crate::error::StorageError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let io_err = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp_path = path.with_extension("tmp");
    let mut tmp = File::create(&tmp_path).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.sync_all().map_err(io_err)?;
    drop(tmp);

    std::fs::rename(&tmp_path, path).map_err(io_err)?;

    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

pub fn read_json<T: for<'de> serde::Deserialize<'de>>(path: &Path) -> Result<Option<T>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&content).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &bytes)
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
