// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact assembly — materialise operation plans into output files.
//
// One plan yields one standalone PDF. Several plans yield one zip archive
// holding a PDF per plan. Intermediate files live in a private working
// directory inside the destination, and final outputs appear there only by
// rename, so a failed run never leaves a partial result behind.

use std::fs;
use std::path::{Path, PathBuf};

use folio_core::config::{ArchiveCompression, FolioConfig};
use folio_core::error::{FolioError, Result};
use folio_core::types::OperationPlan;
use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

use crate::archive::ArchiveWriter;
use crate::naming::{Destination, Namer};
use crate::pdf::{PdfWriter, SourceDocument};

/// Final result of an assembly run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssembledOutput {
    /// A single PDF.
    Single { path: PathBuf },
    /// A zip archive of PDFs, members in plan order.
    Archive { path: PathBuf, members: Vec<String> },
}

impl AssembledOutput {
    pub fn path(&self) -> &Path {
        match self {
            AssembledOutput::Single { path } | AssembledOutput::Archive { path, .. } => path,
        }
    }

    /// Number of PDF artifacts produced.
    pub fn artifact_count(&self) -> usize {
        match self {
            AssembledOutput::Single { .. } => 1,
            AssembledOutput::Archive { members, .. } => members.len(),
        }
    }
}

/// Turns plans into files under a destination directory.
pub struct Assembler<'a> {
    namer: &'a dyn Namer,
    destination: &'a Destination,
    pdf_version: String,
    compression: ArchiveCompression,
}

impl<'a> Assembler<'a> {
    pub fn new(namer: &'a dyn Namer, destination: &'a Destination) -> Self {
        let defaults = FolioConfig::default();
        Self {
            namer,
            destination,
            pdf_version: defaults.pdf_version,
            compression: defaults.archive_compression,
        }
    }

    /// Take the PDF version and archive compression from `config`.
    pub fn configured(mut self, config: &FolioConfig) -> Self {
        self.pdf_version = config.pdf_version.clone();
        self.compression = config.archive_compression;
        self
    }

    /// Materialise every plan against `source`.
    ///
    /// Fails with `EmptyResult` for an empty plan list and with
    /// `WriteFailure` if any artifact cannot be produced; in both cases no
    /// output is left in the destination.
    #[instrument(skip_all, fields(plans = plans.len()))]
    pub fn assemble(
        &self,
        source: &SourceDocument,
        plans: &[OperationPlan],
    ) -> Result<AssembledOutput> {
        if plans.is_empty() {
            return Err(FolioError::EmptyResult);
        }
        self.with_workdir(|workdir| {
            let total = plans.len();
            let mut artifacts = Vec::with_capacity(total);
            for (index, plan) in plans.iter().enumerate() {
                let bytes = source
                    .render_plan(plan, &self.pdf_version)
                    .map_err(|err| as_write_failure(index, err))?;
                let name = self.namer.artifact_name(index, total);
                let path = workdir.join(&name);
                fs::write(&path, &bytes).map_err(|err| {
                    FolioError::WriteFailure(format!("cannot write {name}: {err}"))
                })?;
                debug!(index, pages = plan.len(), artifact = %name, "Artifact written");
                artifacts.push((name, path));
            }
            self.publish(workdir, artifacts)
        })
    }

    /// Concatenate every page of each source, in order, into one PDF.
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub fn merge(&self, sources: &[SourceDocument]) -> Result<AssembledOutput> {
        if sources.is_empty() {
            return Err(FolioError::EmptyResult);
        }
        self.with_workdir(|workdir| {
            let mut writer = PdfWriter::new(&self.pdf_version);
            for source in sources {
                let plan = folio_core::PlanBuilder::new(source.page_count()).build()?;
                writer.append_pages(source, plan.pages())?;
            }
            let pages = writer.page_count();
            let bytes = writer.finish()?;
            let name = self.namer.artifact_name(0, 1);
            let path = workdir.join(&name);
            fs::write(&path, &bytes)
                .map_err(|err| FolioError::WriteFailure(format!("cannot write {name}: {err}")))?;
            info!(pages, "Documents merged");
            self.publish(workdir, vec![(name, path)])
        })
    }

    /// Move finished artifacts into the destination: a lone artifact as-is,
    /// several as one archive.
    fn publish(
        &self,
        workdir: &Path,
        artifacts: Vec<(String, PathBuf)>,
    ) -> Result<AssembledOutput> {
        if let [(name, path)] = artifacts.as_slice() {
            let final_path = self.destination.resolve(name);
            move_into_place(path, &final_path)?;
            info!(output = %final_path.display(), "Single artifact written");
            return Ok(AssembledOutput::Single { path: final_path });
        }

        let archive_name = self.namer.archive_name();
        let staging = workdir.join(format!("{archive_name}.partial"));
        let mut archive = ArchiveWriter::create(&staging, self.compression)?;
        for (name, path) in &artifacts {
            let bytes = fs::read(path)?;
            archive.add_member(name, &bytes)?;
        }
        let members = archive.finish()?;

        let final_path = self.destination.resolve(&archive_name);
        move_into_place(&staging, &final_path)?;
        info!(
            output = %final_path.display(),
            members = members.len(),
            "Archive written"
        );
        Ok(AssembledOutput::Archive {
            path: final_path,
            members,
        })
    }

    /// Run `body` with a fresh working directory that is removed afterwards,
    /// whether or not `body` succeeded.
    fn with_workdir<T>(&self, body: impl FnOnce(&Path) -> Result<T>) -> Result<T> {
        self.destination.ensure()?;
        let workdir = tempfile::Builder::new()
            .prefix(".folio-work-")
            .tempdir_in(self.destination.dir())
            .map_err(|err| {
                FolioError::WriteFailure(format!("cannot create working directory: {err}"))
            })?;

        let result = body(workdir.path());
        cleanup(workdir);
        result
    }
}

fn as_write_failure(index: usize, err: FolioError) -> FolioError {
    match err {
        FolioError::WriteFailure(_) => err,
        other => FolioError::WriteFailure(format!("artifact {}: {}", index + 1, other)),
    }
}

fn move_into_place(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        return Err(FolioError::WriteFailure(format!(
            "refusing to overwrite {}",
            to.display()
        )));
    }
    fs::rename(from, to).map_err(|err| {
        FolioError::WriteFailure(format!("cannot move output to {}: {}", to.display(), err))
    })
}

fn cleanup(workdir: TempDir) {
    let path = workdir.path().to_path_buf();
    if let Err(err) = workdir.close() {
        warn!(path = %path.display(), %err, "failed to remove working directory");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::InvocationNamer;
    use crate::testing::sample_pdf;
    use folio_core::{SplitStrategy, resolve};
    use pretty_assertions::assert_eq;
    use std::fs::File;
    use tempfile::tempdir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn single_plan_is_not_archived() {
        let out = tempdir().unwrap();
        let destination = Destination::new(out.path());
        let namer = InvocationNamer::with_stamp("doc_extract", "t");
        let source = SourceDocument::from_bytes(&sample_pdf(5)).unwrap();
        let plans = resolve(&SplitStrategy::Extract("3,1,1,5".into()), 5).unwrap();

        let output = Assembler::new(&namer, &destination)
            .assemble(&source, &plans)
            .unwrap();

        assert_eq!(
            output,
            AssembledOutput::Single {
                path: out.path().join("doc_extract_t.pdf")
            }
        );
        assert_eq!(entries(out.path()), vec!["doc_extract_t.pdf"]);
        let written = SourceDocument::open(output.path()).unwrap();
        assert_eq!(written.page_count(), 3);
    }

    #[test]
    fn several_plans_become_one_archive() {
        let out = tempdir().unwrap();
        let destination = Destination::new(out.path());
        let namer = InvocationNamer::with_stamp("doc_split", "t");
        let source = SourceDocument::from_bytes(&sample_pdf(7)).unwrap();
        let plans = resolve(&SplitStrategy::Count(3), 7).unwrap();

        let output = Assembler::new(&namer, &destination)
            .assemble(&source, &plans)
            .unwrap();

        let AssembledOutput::Archive { path, members } = &output else {
            panic!("expected an archive, got {output:?}");
        };
        assert_eq!(
            members,
            &vec!["doc_split_1_t.pdf", "doc_split_2_t.pdf", "doc_split_3_t.pdf"]
        );
        // Only the archive remains; no loose PDFs or working files.
        assert_eq!(entries(out.path()), vec!["doc_split_t.zip"]);

        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        assert_eq!(archive.len(), 3);
        let mut sizes = Vec::new();
        for i in 0..archive.len() {
            let mut member = archive.by_index(i).unwrap();
            let mut bytes = Vec::new();
            std::io::Read::read_to_end(&mut member, &mut bytes).unwrap();
            sizes.push(SourceDocument::from_bytes(&bytes).unwrap().page_count());
        }
        assert_eq!(sizes, vec![3, 2, 2]);
    }

    #[test]
    fn empty_plan_list_is_refused() {
        let out = tempdir().unwrap();
        let destination = Destination::new(out.path());
        let namer = InvocationNamer::with_stamp("x", "t");
        let source = SourceDocument::from_bytes(&sample_pdf(1)).unwrap();

        let err = Assembler::new(&namer, &destination)
            .assemble(&source, &[])
            .unwrap_err();
        assert!(matches!(err, FolioError::EmptyResult));
    }

    #[test]
    fn failed_artifact_leaves_nothing_behind() {
        let out = tempdir().unwrap();
        let destination = Destination::new(out.path());
        let namer = InvocationNamer::with_stamp("x", "t");
        let source = SourceDocument::from_bytes(&sample_pdf(2)).unwrap();
        // Planned against a bigger document than the one supplied.
        let plans = resolve(&SplitStrategy::All, 4).unwrap();

        let err = Assembler::new(&namer, &destination)
            .assemble(&source, &plans)
            .unwrap_err();
        assert!(matches!(err, FolioError::WriteFailure(_)));
        assert!(entries(out.path()).is_empty());
    }

    #[test]
    fn existing_archive_is_not_overwritten() {
        let out = tempdir().unwrap();
        let destination = Destination::new(out.path());
        let namer = InvocationNamer::with_stamp("doc_split", "t");
        let source = SourceDocument::from_bytes(&sample_pdf(4)).unwrap();
        let plans = resolve(&SplitStrategy::Count(2), 4).unwrap();
        fs::write(out.path().join("doc_split_t.zip"), b"earlier run").unwrap();

        let err = Assembler::new(&namer, &destination)
            .assemble(&source, &plans)
            .unwrap_err();

        assert!(matches!(err, FolioError::WriteFailure(ref m) if m.contains("refusing to overwrite")));
        assert_eq!(fs::read(out.path().join("doc_split_t.zip")).unwrap(), b"earlier run");
        // No staged archive, loose artifact, or working directory survives.
        assert_eq!(entries(out.path()), vec!["doc_split_t.zip"]);
    }

    #[test]
    fn existing_single_output_is_not_overwritten() {
        let out = tempdir().unwrap();
        let destination = Destination::new(out.path());
        let namer = InvocationNamer::with_stamp("doc_extract", "t");
        let source = SourceDocument::from_bytes(&sample_pdf(2)).unwrap();
        let plans = resolve(&SplitStrategy::Extract("1".into()), 2).unwrap();
        fs::write(out.path().join("doc_extract_t.pdf"), b"keep me").unwrap();

        let err = Assembler::new(&namer, &destination)
            .assemble(&source, &plans)
            .unwrap_err();

        assert!(matches!(err, FolioError::WriteFailure(_)));
        assert_eq!(fs::read(out.path().join("doc_extract_t.pdf")).unwrap(), b"keep me");
        assert_eq!(entries(out.path()), vec!["doc_extract_t.pdf"]);
    }

    #[test]
    fn merge_concatenates_sources() {
        let out = tempdir().unwrap();
        let destination = Destination::new(out.path());
        let namer = InvocationNamer::with_stamp("merged", "t");
        let sources = vec![
            SourceDocument::from_bytes(&sample_pdf(2)).unwrap(),
            SourceDocument::from_bytes(&sample_pdf(3)).unwrap(),
        ];

        let output = Assembler::new(&namer, &destination).merge(&sources).unwrap();
        let merged = SourceDocument::open(output.path()).unwrap();
        assert_eq!(merged.page_count(), 5);
        assert_eq!(entries(out.path()), vec!["merged_t.pdf"]);
    }

    #[test]
    fn stored_compression_is_honoured() {
        let out = tempdir().unwrap();
        let destination = Destination::new(out.path());
        let namer = InvocationNamer::with_stamp("s", "t");
        let source = SourceDocument::from_bytes(&sample_pdf(2)).unwrap();
        let plans = resolve(&SplitStrategy::All, 2).unwrap();
        let config = FolioConfig {
            archive_compression: ArchiveCompression::Stored,
            ..Default::default()
        };

        let output = Assembler::new(&namer, &destination)
            .configured(&config)
            .assemble(&source, &plans)
            .unwrap();
        let mut archive = zip::ZipArchive::new(File::open(output.path()).unwrap()).unwrap();
        let member = archive.by_index(0).unwrap();
        assert_eq!(member.compression(), zip::CompressionMethod::Stored);
    }
}
