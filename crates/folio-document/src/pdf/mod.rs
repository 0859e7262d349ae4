// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — opening source documents and writing new ones from their pages.

pub mod reader;
pub mod writer;

pub use reader::{PageSize, SourceDocument};
pub use writer::PdfWriter;
