// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Zip archive writer used to bundle multi-artifact results.

use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use folio_core::ArchiveCompression;
use folio_core::error::{FolioError, Result};
use tracing::{debug, instrument};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Writes members into a single zip file, in the order they are added.
pub struct ArchiveWriter {
    zip: ZipWriter<File>,
    options: SimpleFileOptions,
    members: Vec<String>,
    seen: HashSet<String>,
}

impl ArchiveWriter {
    /// Create (or truncate) the archive at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn create(path: impl AsRef<Path>, compression: ArchiveCompression) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|err| {
            FolioError::WriteFailure(format!("cannot create archive {}: {}", path.display(), err))
        })?;
        let method = match compression {
            ArchiveCompression::Deflated => CompressionMethod::Deflated,
            ArchiveCompression::Stored => CompressionMethod::Stored,
        };
        Ok(Self {
            zip: ZipWriter::new(file),
            options: SimpleFileOptions::default().compression_method(method),
            members: Vec::new(),
            seen: HashSet::new(),
        })
    }

    /// Append one member. Names must be unique within the archive.
    pub fn add_member(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        if !self.seen.insert(name.to_string()) {
            return Err(FolioError::WriteFailure(format!(
                "duplicate archive member {name}"
            )));
        }
        self.zip
            .start_file(name, self.options)
            .map_err(|err| FolioError::WriteFailure(format!("cannot add {name}: {err}")))?;
        self.zip
            .write_all(bytes)
            .map_err(|err| FolioError::WriteFailure(format!("cannot write {name}: {err}")))?;
        debug!(member = name, bytes = bytes.len(), "Archive member written");
        self.members.push(name.to_string());
        Ok(())
    }

    /// Write the central directory and return the member names in order.
    pub fn finish(self) -> Result<Vec<String>> {
        let file = self
            .zip
            .finish()
            .map_err(|err| FolioError::WriteFailure(format!("cannot finish archive: {err}")))?;
        file.sync_all()?;
        Ok(self.members)
    }
}
