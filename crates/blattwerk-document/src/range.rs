// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-range expressions.
//
// Grammar:
//   expression := group (';' group)*
//   group      := item (',' item)*
//   item       := n | a '-' b
//
// Each group becomes one `PageRange`: 1-based page numbers in first-seen
// order, deduplicated, restricted to [1, page_count]. Out-of-range numbers are
// dropped silently; only malformed tokens are errors.

use std::collections::HashSet;

use blattwerk_core::error::{BlattwerkError, Result};

/// Ordered, distinct, in-bounds 1-based page numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRange(Vec<u32>);

impl PageRange {
    /// A range holding exactly one page.
    pub fn single(page: u32) -> Self {
        Self(vec![page])
    }

    /// One single-page range per page, in document order.
    pub fn each_page(page_count: u32) -> Vec<Self> {
        (1..=page_count).map(Self::single).collect()
    }

    pub fn pages(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse `expression` into one `PageRange` per `;`-separated group.
pub fn parse_groups(expression: &str, page_count: u32) -> Result<Vec<PageRange>> {
    expression
        .split(';')
        .map(|group| parse_group(group, page_count))
        .collect()
}

fn parse_group(group: &str, page_count: u32) -> Result<PageRange> {
    let mut seen = HashSet::new();
    let mut pages = Vec::new();
    let mut push = |page: u32| {
        if seen.insert(page) {
            pages.push(page);
        }
    };

    for item in group.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        match item.split_once('-') {
            Some((start, end)) => {
                let start = parse_number(start, item)?;
                let end = parse_number(end, item)?;
                // `end < start` is not an error; it just selects nothing.
                let low = start.max(1);
                let high = end.min(u64::from(page_count));
                for page in low..=high {
                    push(page as u32);
                }
            }
            None => {
                let page = parse_number(item, item)?;
                if (1..=u64::from(page_count)).contains(&page) {
                    push(page as u32);
                }
            }
        }
    }

    Ok(PageRange(pages))
}

fn parse_number(text: &str, item: &str) -> Result<u64> {
    text.trim()
        .parse::<u64>()
        .map_err(|_| BlattwerkError::InvalidPageRange {
            token: item.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(expression: &str, page_count: u32) -> Vec<Vec<u32>> {
        parse_groups(expression, page_count)
            .unwrap()
            .into_iter()
            .map(|range| range.pages().to_vec())
            .collect()
    }

    #[test]
    fn ranges_and_singles_combine() {
        assert_eq!(pages("1-3,5", 5), vec![vec![1, 2, 3, 5]]);
    }

    #[test]
    fn out_of_bounds_is_dropped_silently() {
        assert_eq!(pages("7", 5), vec![Vec::<u32>::new()]);
        assert_eq!(pages("0,4-9", 5), vec![vec![4, 5]]);
    }

    #[test]
    fn semicolons_separate_groups() {
        assert_eq!(pages("1-3;5", 5), vec![vec![1, 2, 3], vec![5]]);
    }

    #[test]
    fn first_occurrence_order_is_kept() {
        assert_eq!(pages("4,1-3,2,4", 5), vec![vec![4, 1, 2, 3]]);
    }

    #[test]
    fn reversed_range_selects_nothing() {
        assert_eq!(pages("3-1", 5), vec![Vec::<u32>::new()]);
    }

    #[test]
    fn whitespace_and_empty_items_are_ignored() {
        assert_eq!(pages(" 1 - 2 , ,3 ; ", 5), vec![vec![1, 2, 3], vec![]]);
    }

    #[test]
    fn huge_ranges_are_clamped() {
        assert_eq!(pages("2-4000000000", 3), vec![vec![2, 3]]);
    }

    #[test]
    fn malformed_tokens_name_the_item() {
        for (expression, token) in [("1,abc", "abc"), ("1-x", "1-x"), ("-3", "-3"), ("1-2-3", "1-2-3")] {
            match parse_groups(expression, 5) {
                Err(BlattwerkError::InvalidPageRange { token: reported }) => {
                    assert_eq!(reported, token, "expression {expression:?}")
                }
                other => panic!("expected InvalidPageRange for {expression:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn each_page_yields_singletons() {
        let ranges = PageRange::each_page(3);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[2].pages(), &[3]);
    }
}
