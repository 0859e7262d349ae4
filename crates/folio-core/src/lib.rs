// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio — core types, errors, and the page-set planning logic shared by every
// command: range expressions, the operation plan builder, and split strategies.

pub mod config;
pub mod error;
pub mod plan;
pub mod range;
pub mod split;
pub mod types;

pub use config::{ArchiveCompression, FolioConfig};
pub use error::{ErrorClass, FolioError, Result};
pub use plan::{OrganizeRequest, PageOrder, PlanBuilder, RotationMap};
pub use range::{RangePolicy, RangeSet, parse_order, parse_selection};
pub use split::{ModeSelection, SplitParams, SplitStrategy, resolve};
pub use types::*;
