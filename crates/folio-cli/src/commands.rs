// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command adapters. Each maps its parameters onto a split strategy or a plan
// builder call, runs the assembler, and describes the outcome as a `Report`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use folio_core::{
    CropMargins, FolioConfig, FolioError, OperationPlan, OrganizeRequest, PlanBuilder,
    RangePolicy, Rotation, RotationMap, SplitParams, SplitStrategy, parse_selection, resolve,
};
use folio_document::{Assembler, Destination, InvocationNamer, Namer, SourceDocument};
use tracing::{info, instrument};

use crate::report::Report;

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub config: FolioConfig,
    pub destination: Destination,
}

impl Context {
    pub fn new(config: FolioConfig) -> Self {
        let destination = Destination::new(config.output_dir.clone());
        Self {
            config,
            destination,
        }
    }

    fn assembler<'a>(&'a self, namer: &'a dyn Namer) -> Assembler<'a> {
        Assembler::new(namer, &self.destination).configured(&self.config)
    }

    /// Materialise one plan as a standalone PDF.
    fn write_single(
        &self,
        input: &Path,
        operation: &str,
        source: &SourceDocument,
        plan: OperationPlan,
    ) -> Result<PathBuf> {
        let namer = InvocationNamer::for_source(input, operation);
        let output = self.assembler(&namer).assemble(source, &[plan])?;
        Ok(output.path().to_path_buf())
    }
}

/// Split into one or more artifacts according to `mode`.
#[instrument(skip_all, fields(path = %input.display(), mode = %mode))]
pub fn split(ctx: &Context, input: &Path, mode: &str, params: &SplitParams) -> Result<Report> {
    let selection = SplitStrategy::from_mode(mode, params)?;
    let source = SourceDocument::open(input)?;
    let plans = resolve(&selection.strategy, source.page_count())?;

    let namer = InvocationNamer::for_source(input, "split");
    let output = ctx.assembler(&namer).assemble(&source, &plans)?;
    info!(files = output.artifact_count(), "Split complete");

    let mut report = Report::success(Some(output.path()))
        .with("files_count", output.artifact_count())
        .with("mode", selection.strategy.name())
        .with("original_pages", source.page_count());
    if selection.fell_back {
        report = report.with("requested_mode", mode);
    }
    Ok(report)
}

/// Copy the listed pages, sorted and deduplicated, into one PDF.
#[instrument(skip_all, fields(path = %input.display()))]
pub fn extract(ctx: &Context, input: &Path, pages: &str) -> Result<Report> {
    let source = SourceDocument::open(input)?;
    let plans = resolve(&SplitStrategy::Extract(pages.to_string()), source.page_count())?;
    let extracted = plans.iter().map(OperationPlan::len).sum::<usize>();

    let namer = InvocationNamer::for_source(input, "extract");
    let output = ctx.assembler(&namer).assemble(&source, &plans)?;
    Ok(Report::success(Some(output.path())).with("pages", extracted))
}

/// Reorder, rotate, and delete pages as described by a JSON request.
#[instrument(skip_all, fields(path = %input.display()))]
pub fn organize(ctx: &Context, input: &Path, operations: &str) -> Result<Report> {
    let request = OrganizeRequest::from_json(operations)?;
    let source = SourceDocument::open(input)?;
    let total = source.page_count();
    let plan = request.into_builder(total)?.build()?;
    let new_pages = plan.len();

    let output = ctx.write_single(input, "organized", &source, plan)?;
    Ok(Report::success(Some(output.as_path()))
        .with("original_pages", total)
        .with("new_pages", new_pages))
}

/// Drop the pages named by a range expression.
#[instrument(skip_all, fields(path = %input.display()))]
pub fn delete(ctx: &Context, input: &Path, pages: &str) -> Result<Report> {
    let source = SourceDocument::open(input)?;
    let total = source.page_count();
    let deletions = parse_selection(pages, total, RangePolicy::Strict)?;
    if deletions.is_empty() {
        return Err(FolioError::InvalidParameter(
            "no valid pages specified for deletion".into(),
        )
        .into());
    }
    let deleted = deletions.len();
    let plan = PlanBuilder::new(total).deletions(deletions).build()?;
    let remaining = plan.len();

    let output = ctx.write_single(input, "pages_deleted", &source, plan)?;
    Ok(Report::success(Some(output.as_path()))
        .with(
            "message",
            format!("Deleted {deleted} page(s). New PDF has {remaining} page(s)."),
        )
        .with("deleted_pages", deleted)
        .with("new_pages", remaining))
}

/// Rotate every page, or the pages selected by `pages`, by `degrees`.
#[instrument(skip_all, fields(path = %input.display()))]
pub fn rotate(ctx: &Context, input: &Path, degrees: i64, pages: Option<&str>) -> Result<Report> {
    let rotation = Rotation::new(degrees)?;
    if rotation.is_none() {
        return Err(FolioError::InvalidParameter(
            "rotation must be 90, 180, or 270 degrees (got 0)".into(),
        )
        .into());
    }
    let source = SourceDocument::open(input)?;
    let total = source.page_count();
    let selected: Vec<u32> = match pages {
        Some(expr) => parse_selection(expr, total, RangePolicy::Strict)?.to_vec(),
        None => (1..=total as u32).collect(),
    };
    if selected.is_empty() {
        return Err(
            FolioError::InvalidParameter("no valid pages selected for rotation".into()).into(),
        );
    }
    let rotated = selected.len();
    let plan = PlanBuilder::new(total)
        .rotations(RotationMap::uniform(selected, rotation))
        .build()?;

    let output = ctx.write_single(input, &format!("rotated_{degrees}"), &source, plan)?;
    Ok(Report::success(Some(output.as_path()))
        .with("rotation", degrees)
        .with("pages_rotated", rotated))
}

/// Trim the given margins, in points, from every page.
#[instrument(skip_all, fields(path = %input.display()))]
pub fn crop(ctx: &Context, input: &Path, margins: [f64; 4]) -> Result<Report> {
    let [left, bottom, right, top] = margins;
    let crop = CropMargins::new(left, bottom, right, top)?;
    let source = SourceDocument::open(input)?;
    source.check_crop(&crop)?;
    let total = source.page_count();
    let plan = PlanBuilder::new(total).crop(crop).build()?;

    let output = ctx.write_single(input, "cropped", &source, plan)?;
    Ok(Report::success(Some(output.as_path())).with("pages_cropped", total))
}

/// Concatenate several documents, in argument order.
#[instrument(skip_all, fields(files = inputs.len()))]
pub fn merge(ctx: &Context, inputs: &[PathBuf]) -> Result<Report> {
    if inputs.is_empty() {
        return Err(
            FolioError::InvalidParameter("at least one input file required".into()).into(),
        );
    }
    let sources = inputs
        .iter()
        .map(SourceDocument::open)
        .collect::<folio_core::Result<Vec<_>>>()?;
    let pages: usize = sources.iter().map(SourceDocument::page_count).sum();

    let namer = InvocationNamer::new("merged");
    let output = ctx.assembler(&namer).merge(&sources)?;
    Ok(Report::success(Some(output.path()))
        .with("files_merged", sources.len())
        .with("pages", pages))
}

/// Page count and per-page geometry; writes nothing.
#[instrument(skip_all, fields(path = %input.display()))]
pub fn info(input: &Path) -> Result<Report> {
    let source = SourceDocument::open(input)?;
    let sizes = (0..source.page_count())
        .map(|index| source.page_size(index))
        .collect::<folio_core::Result<Vec<_>>>()?;
    Ok(Report::success(None)
        .with("pages", source.page_count())
        .with("page_sizes", sizes))
}
