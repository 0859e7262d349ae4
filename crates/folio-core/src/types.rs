// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: page references and the plans that order them.

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// A quarter-turn rotation, in degrees, forwarded to the page's `/Rotate`.
///
/// Negative values are accepted as counter-clockwise turns; the document layer
/// normalises the composed value into `0..360`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rotation(i32);

impl Rotation {
    pub const NONE: Rotation = Rotation(0);

    const ALLOWED: [i32; 7] = [0, 90, 180, 270, -90, -180, -270];

    pub fn new(degrees: i64) -> Result<Self> {
        i32::try_from(degrees)
            .ok()
            .filter(|d| Self::ALLOWED.contains(d))
            .map(Rotation)
            .ok_or_else(|| {
                FolioError::InvalidParameter(format!(
                    "rotation must be 90, 180, or 270 degrees (got {degrees})"
                ))
            })
    }

    pub fn degrees(self) -> i32 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Compose with an existing `/Rotate` value, normalised to `0..360`.
    pub fn applied_to(self, existing: i64) -> i64 {
        (existing + i64::from(self.0)).rem_euclid(360)
    }
}

impl TryFrom<i64> for Rotation {
    type Error = FolioError;

    fn try_from(value: i64) -> Result<Self> {
        Rotation::new(value)
    }
}

impl From<Rotation> for i64 {
    fn from(value: Rotation) -> Self {
        i64::from(value.0)
    }
}

/// Margins, in points, trimmed from each edge of a page's visible area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropMargins {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl CropMargins {
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Result<Self> {
        let margins = Self {
            left,
            bottom,
            right,
            top,
        };
        if [left, bottom, right, top]
            .iter()
            .any(|m| !m.is_finite() || *m < 0.0)
        {
            return Err(FolioError::InvalidParameter(format!(
                "crop margins must be finite and non-negative: {margins:?}"
            )));
        }
        Ok(margins)
    }

    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.bottom == 0.0 && self.right == 0.0 && self.top == 0.0
    }

    /// Shrink a `[llx, lly, urx, ury]` box by these margins.
    ///
    /// Fails when the margins would leave no visible area.
    pub fn apply(&self, [llx, lly, urx, ury]: [f64; 4]) -> Result<[f64; 4]> {
        let cropped = [
            llx + self.left,
            lly + self.bottom,
            urx - self.right,
            ury - self.top,
        ];
        if cropped[0] >= cropped[2] || cropped[1] >= cropped[3] {
            return Err(FolioError::InvalidParameter(format!(
                "crop margins leave no visible area on a {}x{} page",
                urx - llx,
                ury - lly
            )));
        }
        Ok(cropped)
    }
}

/// One source page and the transform to apply when it is copied to an output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRef {
    /// 0-based index into the source document.
    pub source_index: usize,
    pub rotation: Rotation,
    pub crop: Option<CropMargins>,
}

impl PageRef {
    pub fn new(source_index: usize) -> Self {
        Self {
            source_index,
            rotation: Rotation::NONE,
            crop: None,
        }
    }

    pub fn rotated(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn cropped(mut self, crop: CropMargins) -> Self {
        self.crop = Some(crop);
        self
    }

    /// 1-based page number as users see it.
    pub fn page_number(&self) -> u32 {
        self.source_index as u32 + 1
    }
}

/// Ordered page references describing exactly one output document.
///
/// Always non-empty and always within the bounds of the source it was built
/// against.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationPlan {
    pages: Vec<PageRef>,
}

impl OperationPlan {
    /// Build a plan from explicit references, checking bounds against
    /// `total_pages`. Duplicate references are allowed here.
    pub fn from_refs(pages: Vec<PageRef>, total_pages: usize) -> Result<Self> {
        if pages.is_empty() {
            return Err(FolioError::EmptyResult);
        }
        if let Some(bad) = pages.iter().find(|p| p.source_index >= total_pages) {
            return Err(FolioError::InvalidParameter(format!(
                "page {} out of range (document has {} pages)",
                bad.page_number(),
                total_pages
            )));
        }
        Ok(Self { pages })
    }

    /// Plan covering 1-based page numbers in the given order, unrotated.
    pub fn from_page_numbers(numbers: &[u32], total_pages: usize) -> Result<Self> {
        let pages = numbers
            .iter()
            .map(|&n| {
                if n == 0 {
                    Err(FolioError::InvalidParameter("page numbers start at 1".into()))
                } else {
                    Ok(PageRef::new(n as usize - 1))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_refs(pages, total_pages)
    }

    pub fn pages(&self) -> &[PageRef] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// 1-based page numbers in plan order.
    pub fn page_numbers(&self) -> Vec<u32> {
        self.pages.iter().map(PageRef::page_number).collect()
    }

    /// Apply the same crop to every page in the plan.
    pub fn with_crop(mut self, crop: CropMargins) -> Self {
        for page in &mut self.pages {
            page.crop = Some(crop);
        }
        self
    }
}
