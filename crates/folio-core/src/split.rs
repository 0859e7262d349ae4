// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Split strategies — partition one source document into one or more plans,
// one plan per output artifact.

use tracing::{debug, info, instrument, warn};

use crate::error::{FolioError, Result};
use crate::range::{RangePolicy, parse_selection};
use crate::types::OperationPlan;

/// How a document is divided into output artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitStrategy {
    /// One output per page.
    All,
    /// One single-page output per page selected by a range expression.
    Ranges(String),
    /// A single output holding every selected page.
    Extract(String),
    /// Consecutive groups of this many pages.
    Every(i64),
    /// This many outputs of near-equal size.
    Count(i64),
}

/// Raw mode parameters as they arrive from a command line or form.
#[derive(Debug, Clone, Default)]
pub struct SplitParams {
    pub page_ranges: Option<String>,
    pub page_numbers: Option<String>,
    pub every_pages: Option<String>,
    pub file_count: Option<String>,
}

/// Outcome of mapping a mode tag onto a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSelection {
    pub strategy: SplitStrategy,
    /// Set when the tag was unrecognised and `All` was substituted.
    pub fell_back: bool,
}

impl SplitStrategy {
    /// Map a mode tag (`all`, `ranges`, `extract`, `every`, `count`) and its
    /// parameters onto a strategy. Unknown tags select `All`.
    pub fn from_mode(mode: &str, params: &SplitParams) -> Result<ModeSelection> {
        let strategy = match mode.trim().to_ascii_lowercase().as_str() {
            "all" => SplitStrategy::All,
            "ranges" => SplitStrategy::Ranges(required(
                &params.page_ranges,
                "page ranges are required for this mode",
            )?),
            "extract" => SplitStrategy::Extract(required(
                &params.page_numbers,
                "page numbers are required for this mode",
            )?),
            "every" => SplitStrategy::Every(integer(&params.every_pages, "everyPages")?),
            "count" => SplitStrategy::Count(integer(&params.file_count, "fileCount")?),
            other => {
                warn!(mode = other, "unknown split mode, splitting every page");
                return Ok(ModeSelection {
                    strategy: SplitStrategy::All,
                    fell_back: true,
                });
            }
        };
        Ok(ModeSelection {
            strategy,
            fell_back: false,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SplitStrategy::All => "all",
            SplitStrategy::Ranges(_) => "ranges",
            SplitStrategy::Extract(_) => "extract",
            SplitStrategy::Every(_) => "every",
            SplitStrategy::Count(_) => "count",
        }
    }
}

fn required(value: &Option<String>, message: &str) -> Result<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FolioError::InvalidParameter(message.to_string()))
}

fn integer(value: &Option<String>, name: &str) -> Result<i64> {
    let raw = required(value, &format!("{name} is required for this mode"))?;
    raw.parse::<i64>()
        .map_err(|_| FolioError::InvalidParameter(format!("{name} must be an integer, got {raw:?}")))
}

/// Resolve a strategy against a document of `total_pages` pages.
#[instrument(skip(strategy), fields(strategy = strategy.name()))]
pub fn resolve(strategy: &SplitStrategy, total_pages: usize) -> Result<Vec<OperationPlan>> {
    if total_pages == 0 {
        return Err(FolioError::EmptyDocument);
    }

    let plans = match strategy {
        SplitStrategy::All => single_pages(1..=total_pages as u32, total_pages)?,
        SplitStrategy::Ranges(expr) => {
            let selected = parse_selection(expr, total_pages, RangePolicy::Lenient)?;
            if selected.is_empty() {
                return Err(FolioError::InvalidParameter(format!(
                    "no valid pages in range {expr:?}"
                )));
            }
            single_pages(selected.iter(), total_pages)?
        }
        SplitStrategy::Extract(list) => {
            let selected = parse_selection(list, total_pages, RangePolicy::Strict)?;
            if selected.is_empty() {
                return Err(FolioError::InvalidParameter(format!(
                    "no valid pages to extract in {list:?}"
                )));
            }
            vec![OperationPlan::from_page_numbers(&selected.to_vec(), total_pages)?]
        }
        SplitStrategy::Every(group_size) => every(*group_size, total_pages)?,
        SplitStrategy::Count(file_count) => count(*file_count, total_pages)?,
    };

    info!(total_pages, outputs = plans.len(), "split resolved");
    Ok(plans)
}

fn single_pages(
    pages: impl IntoIterator<Item = u32>,
    total_pages: usize,
) -> Result<Vec<OperationPlan>> {
    pages
        .into_iter()
        .map(|p| OperationPlan::from_page_numbers(&[p], total_pages))
        .collect()
}

fn every(group_size: i64, total_pages: usize) -> Result<Vec<OperationPlan>> {
    let size = usize::try_from(group_size.max(1)).unwrap_or(usize::MAX);
    debug!(requested = group_size, size, "grouping pages");

    let numbers: Vec<u32> = (1..=total_pages as u32).collect();
    numbers
        .chunks(size)
        .map(|group| OperationPlan::from_page_numbers(group, total_pages))
        .collect()
}

fn count(file_count: i64, total_pages: usize) -> Result<Vec<OperationPlan>> {
    // A one-page document cannot be split into two non-empty outputs.
    let floor = 2.min(total_pages);
    let files = usize::try_from(file_count.max(0))
        .unwrap_or(usize::MAX)
        .clamp(floor, total_pages);
    let base = total_pages / files;
    let remainder = total_pages % files;
    debug!(requested = file_count, files, base, remainder, "dividing pages");

    let mut plans = Vec::with_capacity(files);
    let mut next = 1u32;
    for index in 0..files {
        let size = (base + usize::from(index < remainder)) as u32;
        let group: Vec<u32> = (next..next + size).collect();
        plans.push(OperationPlan::from_page_numbers(&group, total_pages)?);
        next += size;
    }
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn numbers(plans: &[OperationPlan]) -> Vec<Vec<u32>> {
        plans.iter().map(OperationPlan::page_numbers).collect()
    }

    #[test]
    fn empty_document_is_refused() {
        let err = resolve(&SplitStrategy::All, 0).unwrap_err();
        assert!(matches!(err, FolioError::EmptyDocument));
    }

    #[test]
    fn all_gives_one_plan_per_page() {
        let plans = resolve(&SplitStrategy::All, 3).unwrap();
        assert_eq!(numbers(&plans), vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn ranges_gives_single_pages_in_ascending_order() {
        let plans = resolve(&SplitStrategy::Ranges("5,1-2,2".into()), 6).unwrap();
        assert_eq!(numbers(&plans), vec![vec![1], vec![2], vec![5]]);
    }

    #[test]
    fn ranges_tolerates_malformed_tokens() {
        let plans = resolve(&SplitStrategy::Ranges("2,oops".into()), 3).unwrap();
        assert_eq!(numbers(&plans), vec![vec![2]]);
    }

    #[test]
    fn ranges_with_nothing_selected_is_invalid() {
        let err = resolve(&SplitStrategy::Ranges("7-9".into()), 3).unwrap_err();
        assert!(matches!(err, FolioError::InvalidParameter(_)));
    }

    #[test]
    fn extract_merges_into_one_sorted_plan() {
        let plans = resolve(&SplitStrategy::Extract("3,1,1,5".into()), 5).unwrap();
        assert_eq!(numbers(&plans), vec![vec![1, 3, 5]]);

        let ranges = resolve(&SplitStrategy::Ranges("3,1,1,5".into()), 5).unwrap();
        assert_eq!(ranges.len(), 3);
    }

    #[test]
    fn extract_is_strict_about_syntax() {
        let err = resolve(&SplitStrategy::Extract("1,two".into()), 5).unwrap_err();
        assert!(matches!(err, FolioError::InvalidRangeSyntax(_)));
    }

    #[test]
    fn every_groups_consecutive_pages() {
        let plans = resolve(&SplitStrategy::Every(2), 5).unwrap();
        assert_eq!(numbers(&plans), vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[test]
    fn every_clamps_group_size_to_one() {
        let plans = resolve(&SplitStrategy::Every(-4), 3).unwrap();
        assert_eq!(plans.len(), 3);
    }

    #[test]
    fn count_spreads_remainder_over_first_files() {
        let plans = resolve(&SplitStrategy::Count(3), 7).unwrap();
        assert_eq!(numbers(&plans), vec![vec![1, 2, 3], vec![4, 5], vec![6, 7]]);
    }

    #[test]
    fn count_is_raised_to_two() {
        let plans = resolve(&SplitStrategy::Count(0), 4).unwrap();
        assert_eq!(numbers(&plans), vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn count_is_lowered_to_page_total() {
        let plans = resolve(&SplitStrategy::Count(50), 3).unwrap();
        assert_eq!(plans.len(), 3);
        assert!(plans.iter().all(|p| p.len() == 1));
    }

    #[test]
    fn count_on_single_page_document() {
        let plans = resolve(&SplitStrategy::Count(2), 1).unwrap();
        assert_eq!(numbers(&plans), vec![vec![1]]);
    }

    #[test]
    fn unknown_mode_falls_back_to_all() {
        let selection = SplitStrategy::from_mode("halves", &SplitParams::default()).unwrap();
        assert_eq!(selection.strategy, SplitStrategy::All);
        assert!(selection.fell_back);
    }

    #[test]
    fn known_modes_read_their_parameters() {
        let params = SplitParams {
            page_ranges: Some("1-3".into()),
            every_pages: Some(" 4 ".into()),
            file_count: Some("x".into()),
            ..Default::default()
        };
        let ranges = SplitStrategy::from_mode("ranges", &params).unwrap();
        assert_eq!(ranges.strategy, SplitStrategy::Ranges("1-3".into()));
        assert!(!ranges.fell_back);

        let every = SplitStrategy::from_mode("EVERY", &params).unwrap();
        assert_eq!(every.strategy, SplitStrategy::Every(4));

        assert!(SplitStrategy::from_mode("count", &params).is_err());
        assert!(SplitStrategy::from_mode("extract", &params).is_err());
    }

    proptest! {
        #[test]
        fn count_covers_every_page_once(total in 1usize..200, requested in -5i64..300) {
            let plans = resolve(&SplitStrategy::Count(requested), total).unwrap();
            let flat: Vec<u32> = plans.iter().flat_map(|p| p.page_numbers()).collect();
            let expected: Vec<u32> = (1..=total as u32).collect();
            prop_assert_eq!(flat, expected);

            let sizes: Vec<usize> = plans.iter().map(OperationPlan::len).collect();
            let max = *sizes.iter().max().unwrap();
            let min = *sizes.iter().min().unwrap();
            prop_assert!(max - min <= 1);
        }

        #[test]
        fn every_partitions_into_ceiling_groups(total in 1usize..200, size in 1i64..50) {
            let plans = resolve(&SplitStrategy::Every(size), total).unwrap();
            let sum: usize = plans.iter().map(OperationPlan::len).sum();
            prop_assert_eq!(sum, total);
            prop_assert_eq!(plans.len(), total.div_ceil(size as usize));
        }
    }
}
