// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// How archive members are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveCompression {
    #[default]
    Deflated,
    Stored,
}

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Directory that receives final artifacts.
    pub output_dir: PathBuf,
    /// Compression used for multi-artifact archives.
    pub archive_compression: ArchiveCompression,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
    /// PDF header version written to new documents.
    pub pdf_version: String,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("download"),
            archive_compression: ArchiveCompression::Deflated,
            log_filter: "info".to_string(),
            pdf_version: "1.5".to_string(),
        }
    }
}

impl FolioConfig {
    /// Load settings from a JSON file. Absent keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|err| {
            FolioError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        serde_json::from_str(&data)
            .map_err(|err| FolioError::Config(format!("invalid {}: {}", path.display(), err)))
    }
}
