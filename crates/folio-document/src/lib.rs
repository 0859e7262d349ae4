// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-document — Document handling for Folio.
//
// Opens source PDFs with lopdf, copies planned pages into new documents with
// rotation and crop applied, and publishes the results either as a single PDF
// or as a zip archive of PDFs.

pub mod archive;
pub mod assemble;
pub mod naming;
pub mod pdf;

#[cfg(any(test, feature = "fixtures"))]
pub mod testing;

// Re-export the primary structs so callers can use `folio_document::Assembler` etc.
pub use archive::ArchiveWriter;
pub use assemble::{AssembledOutput, Assembler};
pub use naming::{Destination, InvocationNamer, Namer};
pub use pdf::{PageSize, PdfWriter, SourceDocument};
