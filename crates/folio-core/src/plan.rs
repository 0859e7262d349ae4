// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operation plan builder — turns a delete set, an explicit page order, and a
// per-page rotation map into the single ordered plan for one output document.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use tracing::debug;

use crate::error::{FolioError, Result};
use crate::range::{RangePolicy, RangeSet, parse_order};
use crate::types::{CropMargins, OperationPlan, PageRef, Rotation};

/// Rotations keyed by 1-based page number.
///
/// Deserialises from a JSON object whose keys are page numbers in string form
/// (`{"1": 90, "3": 180}`), which is how integer keys arrive over JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, i64>")]
pub struct RotationMap(BTreeMap<u32, Rotation>);

impl RotationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, page: u32, rotation: Rotation) {
        self.0.insert(page, rotation);
    }

    /// Insert using a page number given as text, e.g. a JSON object key.
    pub fn insert_key(&mut self, key: &str, degrees: i64) -> Result<()> {
        let page = key.trim().parse::<u32>().map_err(|_| {
            FolioError::InvalidParameter(format!("rotation key is not a page number: {key:?}"))
        })?;
        self.insert(page, Rotation::new(degrees)?);
        Ok(())
    }

    pub fn get(&self, page: u32) -> Rotation {
        self.0.get(&page).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The same rotation for every listed page.
    pub fn uniform(pages: impl IntoIterator<Item = u32>, rotation: Rotation) -> Self {
        Self(pages.into_iter().map(|p| (p, rotation)).collect())
    }
}

impl TryFrom<BTreeMap<String, i64>> for RotationMap {
    type Error = FolioError;

    fn try_from(raw: BTreeMap<String, i64>) -> Result<Self> {
        let mut map = RotationMap::new();
        for (key, degrees) in raw {
            map.insert_key(&key, degrees)?;
        }
        Ok(map)
    }
}

/// Builds the plan for a single output document from a source of
/// `total_pages` pages.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    total_pages: usize,
    order: Option<Vec<u32>>,
    rotations: RotationMap,
    deletions: RangeSet,
    crop: Option<CropMargins>,
}

impl PlanBuilder {
    pub fn new(total_pages: usize) -> Self {
        Self {
            total_pages,
            order: None,
            rotations: RotationMap::new(),
            deletions: RangeSet::new(),
            crop: None,
        }
    }

    /// Explicit 1-based output order. Repeats and out-of-range numbers are
    /// tolerated; the build pass drops them.
    pub fn order(mut self, order: Vec<u32>) -> Self {
        self.order = Some(order);
        self
    }

    pub fn rotations(mut self, rotations: RotationMap) -> Self {
        self.rotations = rotations;
        self
    }

    pub fn deletions(mut self, deletions: RangeSet) -> Self {
        self.deletions = deletions;
        self
    }

    pub fn crop(mut self, crop: CropMargins) -> Self {
        self.crop = Some(crop);
        self
    }

    pub fn build(self) -> Result<OperationPlan> {
        let total = u32::try_from(self.total_pages).unwrap_or(u32::MAX);
        let explicit = self.order.is_some();

        if !explicit && total > 0 && (1..=total).all(|p| self.deletions.contains(p)) {
            return Err(FolioError::AllPagesDeleted);
        }

        let order = self.order.unwrap_or_else(|| (1..=total).collect());
        let mut emitted = BTreeSet::new();
        let mut pages = Vec::with_capacity(order.len());

        for page in order {
            if self.deletions.contains(page) {
                continue;
            }
            if page < 1 || page > total {
                debug!(page, total, "dropping out-of-range page from order");
                continue;
            }
            if !emitted.insert(page) {
                continue;
            }
            let mut page_ref = PageRef::new(page as usize - 1).rotated(self.rotations.get(page));
            page_ref.crop = self.crop;
            pages.push(page_ref);
        }

        OperationPlan::from_refs(pages, self.total_pages)
    }
}

/// Explicit page order: a JSON array, or a range expression such as
/// `"4,1-3"` where repeats are kept and bad tokens are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PageOrder {
    Pages(Vec<i64>),
    Expression(String),
}

impl PageOrder {
    fn resolve(self, total_pages: usize) -> Result<Vec<u32>> {
        match self {
            PageOrder::Pages(pages) => Ok(pages
                .into_iter()
                .filter_map(|p| u32::try_from(p).ok())
                .collect()),
            PageOrder::Expression(expr) => parse_order(&expr, total_pages, RangePolicy::Strict),
        }
    }
}

/// Page operations accepted by the organize command, as JSON.
///
/// ```json
/// { "order": [1, 3, 2, 4], "rotate": {"1": 90, "3": 180}, "delete": [5, 6] }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizeRequest {
    #[serde(default)]
    pub order: Option<PageOrder>,
    #[serde(default)]
    pub rotate: RotationMap,
    #[serde(default)]
    pub delete: Vec<i64>,
}

impl OrganizeRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| FolioError::InvalidParameter(format!("invalid operations JSON: {err}")))
    }

    /// Fails with `InvalidRangeSyntax` when a string `order` is malformed.
    pub fn into_builder(self, total_pages: usize) -> Result<PlanBuilder> {
        let deletions = self
            .delete
            .iter()
            .filter_map(|&p| u32::try_from(p).ok())
            .collect();
        let mut builder = PlanBuilder::new(total_pages)
            .rotations(self.rotate)
            .deletions(deletions);
        if let Some(order) = self.order {
            builder = builder.order(order.resolve(total_pages)?);
        }
        Ok(builder)
    }
}
