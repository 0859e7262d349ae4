// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output naming and destination resolution.
//
// Names are derived from an operation label plus an invocation stamp
// (timestamp and a random suffix), so concurrent runs writing into the same
// directory never collide.

use std::path::{Path, PathBuf};

use chrono::Local;
use folio_core::error::{FolioError, Result};
use uuid::Uuid;

/// Supplies deterministic artifact names for one invocation.
pub trait Namer {
    /// File name of artifact `index` (0-based) out of `total`.
    fn artifact_name(&self, index: usize, total: usize) -> String;

    /// File name of the archive bundling several artifacts.
    fn archive_name(&self) -> String;
}

/// Names of the form `{label}_{YYYYmmdd_HHMMSS}_{id}[_{n}].pdf`.
#[derive(Debug, Clone)]
pub struct InvocationNamer {
    label: String,
    stamp: String,
}

impl InvocationNamer {
    /// `label` is used verbatim after sanitising path separators.
    pub fn new(label: &str) -> Self {
        let id = Uuid::new_v4().simple().to_string();
        let stamp = format!("{}_{}", Local::now().format("%Y%m%d_%H%M%S"), &id[..8]);
        Self::with_stamp(label, stamp)
    }

    /// Label built from the source file's stem and the operation,
    /// e.g. `report_split`.
    pub fn for_source(source: impl AsRef<Path>, operation: &str) -> Self {
        let stem = source
            .as_ref()
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("document");
        Self::new(&format!("{stem}_{operation}"))
    }

    /// Fixed stamp, for reproducible names.
    pub fn with_stamp(label: &str, stamp: impl Into<String>) -> Self {
        let label = label
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        Self {
            label,
            stamp: stamp.into(),
        }
    }
}

impl Namer for InvocationNamer {
    fn artifact_name(&self, index: usize, total: usize) -> String {
        if total <= 1 {
            return format!("{}_{}.pdf", self.label, self.stamp);
        }
        let width = total.to_string().len();
        format!(
            "{}_{:0width$}_{}.pdf",
            self.label,
            index + 1,
            self.stamp,
            width = width
        )
    }

    fn archive_name(&self) -> String {
        format!("{}_{}.zip", self.label, self.stamp)
    }
}

/// Directory receiving final artifacts.
#[derive(Debug, Clone)]
pub struct Destination {
    dir: PathBuf,
}

impl Destination {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if needed.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|err| {
            FolioError::WriteFailure(format!(
                "cannot create output directory {}: {}",
                self.dir.display(),
                err
            ))
        })
    }

    pub fn resolve(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}
