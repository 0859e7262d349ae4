// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Folio.

use thiserror::Error;

/// Top-level error type for all Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    // -- Source documents --
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("failed to parse document: {0}")]
    Parse(String),

    // -- User input --
    #[error("invalid page range syntax: {0}")]
    InvalidRangeSyntax(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    // -- Guard conditions --
    #[error("no pages remaining after operations")]
    EmptyResult,

    #[error("cannot delete all pages")]
    AllPagesDeleted,

    #[error("document has no pages")]
    EmptyDocument,

    // -- Output --
    #[error("failed to write output: {0}")]
    WriteFailure(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad grouping of errors, used to pick log levels and exit behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller supplied something unusable (bad path, bad range, bad JSON).
    UserInput,
    /// The request was well-formed but would produce a meaningless artifact.
    Guard,
    /// The document or filesystem layer failed underneath us.
    Io,
}

impl FolioError {
    /// Stable snake_case tag reported in the JSON result record.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Parse(_) => "parse_error",
            Self::InvalidRangeSyntax(_) => "invalid_range_syntax",
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::EmptyResult => "empty_result",
            Self::AllPagesDeleted => "all_pages_deleted",
            Self::EmptyDocument => "empty_document",
            Self::WriteFailure(_) => "write_failure",
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound(_)
            | Self::InvalidRangeSyntax(_)
            | Self::InvalidParameter(_)
            | Self::Config(_) => ErrorClass::UserInput,
            Self::EmptyResult | Self::AllPagesDeleted | Self::EmptyDocument => ErrorClass::Guard,
            Self::Parse(_) | Self::WriteFailure(_) | Self::Io(_) => ErrorClass::Io,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;
