// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page range expressions — "1,3,5-7" style selections typed by users.
//
// Two readings of the same syntax exist: selection (sorted, deduplicated) for
// delete/extract/split, and order (caller sequence, repeats kept) for
// reordering. Out-of-bounds pages are dropped in both; malformed tokens are
// either rejected or skipped depending on the call site's `RangePolicy`.

use std::collections::BTreeSet;
use std::num::IntErrorKind;

use tracing::debug;

use crate::error::{FolioError, Result};

/// How a call site treats tokens that are not `N` or `N-M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePolicy {
    /// Malformed tokens fail with `InvalidRangeSyntax`.
    Strict,
    /// Malformed tokens are skipped.
    Lenient,
}

/// Sorted, deduplicated set of 1-based page numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet(BTreeSet<u32>);

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, page: u32) -> bool {
        self.0.contains(&page)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }
}

impl FromIterator<u32> for RangeSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Page(u64),
    Span(u64, u64),
}

impl Token {
    fn parse(raw: &str) -> Option<Self> {
        match raw.split_once('-') {
            Some((start, end)) => Some(Token::Span(number(start)?, number(end)?)),
            None => number(raw).map(Token::Page),
        }
    }

    /// Pages this token contributes, ascending, already clipped to the document.
    fn pages(self, total_pages: u32) -> std::ops::RangeInclusive<u32> {
        let (start, end) = match self {
            Token::Page(p) => (p, p),
            Token::Span(start, end) => (start.max(1), end),
        };
        let end = end.min(u64::from(total_pages));
        if start == 0 || start > end {
            return empty_range();
        }
        // Both bounds are now within 1..=total_pages.
        start as u32..=end as u32
    }
}

/// A page number as typed. Digits too large for any document saturate, so
/// they are dropped by clipping rather than rejected as syntax.
fn number(raw: &str) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(n) => Some(n),
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => Some(u64::MAX),
        Err(_) => None,
    }
}

#[allow(clippy::reversed_empty_ranges)]
fn empty_range() -> std::ops::RangeInclusive<u32> {
    1..=0
}

fn tokens(expr: &str, policy: RangePolicy) -> Result<Vec<Token>> {
    let mut parsed = Vec::new();
    for raw in expr.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match Token::parse(raw) {
            Some(token) => parsed.push(token),
            None => match policy {
                RangePolicy::Strict => {
                    return Err(FolioError::InvalidRangeSyntax(raw.to_string()));
                }
                RangePolicy::Lenient => debug!(token = raw, "skipping malformed range token"),
            },
        }
    }
    Ok(parsed)
}

fn clamp_total(total_pages: usize) -> u32 {
    u32::try_from(total_pages).unwrap_or(u32::MAX)
}

/// Parse `expr` as a selection: sorted ascending, each page at most once.
pub fn parse_selection(expr: &str, total_pages: usize, policy: RangePolicy) -> Result<RangeSet> {
    let total = clamp_total(total_pages);
    Ok(tokens(expr, policy)?
        .into_iter()
        .flat_map(|t| t.pages(total))
        .collect())
}

/// Parse `expr` as an explicit order: caller sequence preserved, repeats kept.
pub fn parse_order(expr: &str, total_pages: usize, policy: RangePolicy) -> Result<Vec<u32>> {
    let total = clamp_total(total_pages);
    Ok(tokens(expr, policy)?
        .into_iter()
        .flat_map(|t| t.pages(total))
        .collect())
}
