//! Filter state and view derivation
//!
//! `FilterState` is the single owner of everything that narrows or orders
//! the grid: free-text column filters, the current sort, and the active
//! quick filter preset. The dataset itself is never touched; `view` derives
//! a filtered, sorted list of references into it.

pub mod predicate;
pub mod presets;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::models::{Column, Dataset, Holding};
use predicate::{evaluate, matches_text, CellValue};
use presets::{PresetId, PresetPredicate};

/// Page sizes offered by the grid
pub const PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: Column,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: Column, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Order two holdings. Absent cells go last in both directions.
    pub fn compare(&self, a: &Holding, b: &Holding) -> Ordering {
        let (left, right) = (self.column.cell(a), self.column.cell(b));
        match (left, right) {
            (CellValue::Empty, CellValue::Empty) => Ordering::Equal,
            (CellValue::Empty, _) => Ordering::Greater,
            (_, CellValue::Empty) => Ordering::Less,
            _ => {
                let ord = compare_cells(left, right);
                match self.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            }
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.column, self.direction.as_str())
    }
}

fn compare_cells(left: CellValue<'_>, right: CellValue<'_>) -> Ordering {
    match (left, right) {
        (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(&b),
        (CellValue::Text(a), CellValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (CellValue::Number(_), _) => Ordering::Less,
        (_, CellValue::Number(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Everything that shapes the current view of the dataset
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    column_filters: BTreeMap<Column, String>,
    sort: Option<SortSpec>,
    active_preset: Option<PresetId>,
    preset_predicate: Option<PresetPredicate>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state the grid starts in: Aug share, largest first.
    pub fn initial() -> Self {
        Self {
            sort: Some(SortSpec::new(
                Column::MarketValuePctPeriodA,
                SortDirection::Descending,
            )),
            ..Self::default()
        }
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn active_preset(&self) -> Option<PresetId> {
        self.active_preset
    }

    pub fn preset_predicate(&self) -> Option<PresetPredicate> {
        self.preset_predicate
    }

    pub fn column_filters(&self) -> &BTreeMap<Column, String> {
        &self.column_filters
    }

    /// Activate a quick filter, replacing whichever one was active.
    ///
    /// `clear` only deactivates: the preset predicate goes away and the
    /// current sort is kept. Column filters are never touched here.
    pub fn apply_preset(self, preset: PresetId) -> Self {
        let outcome = preset.apply();
        debug!("Applying quick filter {} -> {:?}", preset, outcome);

        let mut next = Self {
            preset_predicate: None,
            active_preset: None,
            ..self
        };

        if preset == PresetId::Clear {
            return next;
        }

        next.preset_predicate = outcome.predicate;
        if let Some(sort) = outcome.sort {
            next.sort = Some(sort);
        }
        next.active_preset = Some(preset);
        next
    }

    /// Set the filter text for one column; empty text removes it.
    pub fn set_column_filter(&mut self, column: Column, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            self.column_filters.remove(&column);
        } else {
            self.column_filters.insert(column, text);
        }
    }

    pub fn remove_column_filter(&mut self, column: Column) {
        self.column_filters.remove(&column);
    }

    pub fn clear_column_filters(&mut self) {
        self.column_filters.clear();
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
    }

    /// Whether a row survives the preset predicate and every column filter.
    pub fn matches(&self, holding: &Holding) -> bool {
        if let Some(predicate) = self.preset_predicate {
            if !predicate.matches(holding) {
                return false;
            }
        }

        self.column_filters.iter().all(|(column, text)| {
            let cell = column.cell(holding);
            match column.kind().value_kind() {
                Some(kind) => evaluate(text, cell, kind),
                None => matches_text(text, cell),
            }
        })
    }

    /// Filtered and sorted rows. Ties keep dataset order.
    pub fn view<'a>(&self, dataset: &'a Dataset) -> Vec<&'a Holding> {
        let mut rows: Vec<&Holding> = dataset.iter().filter(|h| self.matches(h)).collect();
        if let Some(sort) = self.sort {
            rows.sort_by(|a, b| sort.compare(a, b));
        }
        debug!("View has {} of {} rows", rows.len(), dataset.len());
        rows
    }
}

/// One page of a view (pages are 1-based)
pub fn paginate<'v, 'a>(
    rows: &'v [&'a Holding],
    page: usize,
    page_size: usize,
) -> &'v [&'a Holding] {
    if page_size == 0 {
        return rows;
    }
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= rows.len() {
        return &[];
    }
    let end = (start + page_size).min(rows.len());
    &rows[start..end]
}

/// Number of pages needed to show `rows` rows
pub fn page_count(rows: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    rows.div_ceil(page_size).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(name: &str, a: Option<f64>, b: Option<f64>, qty: Option<f64>) -> Holding {
        Holding {
            market_value_pct_period_a: a,
            market_value_pct_period_b: b,
            quantity_pct_change: qty,
            ..Holding::new(name)
        }
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            holding("Alpha", Some(0.02), None, Some(0.5)),
            holding("Beta", Some(0.03), Some(0.01), Some(-0.2)),
            holding("Gamma", None, Some(0.04), None),
            holding("Delta", Some(0.01), Some(0.0), Some(0.1)),
        ])
    }

    fn names(rows: &[&Holding]) -> Vec<String> {
        rows.iter().map(|h| h.name.clone()).collect()
    }

    #[test]
    fn test_increase_then_decrease_leaves_decrease_active() {
        let state = FilterState::new()
            .apply_preset(PresetId::Increase)
            .apply_preset(PresetId::Decrease);
        assert_eq!(state.active_preset(), Some(PresetId::Decrease));
        assert_eq!(
            state.preset_predicate(),
            Some(PresetPredicate::QuantityDecrease)
        );
        assert_eq!(names(&state.view(&sample())), vec!["Beta"]);
    }

    #[test]
    fn test_clear_keeps_sort_and_column_filters() {
        let mut state = FilterState::new().apply_preset(PresetId::Exits);
        state.set_column_filter(Column::Name, "a");
        let state = state.apply_preset(PresetId::Clear);
        assert_eq!(state.active_preset(), None);
        assert_eq!(state.preset_predicate(), None);
        assert_eq!(
            state.sort(),
            Some(SortSpec::new(Column::MarketValuePctPeriodB, SortDirection::Descending))
        );
        assert_eq!(state.column_filters().get(&Column::Name).map(String::as_str), Some("a"));
    }

    #[test]
    fn test_top_holdings_drops_previous_predicate() {
        let state = FilterState::new()
            .apply_preset(PresetId::NewEntries)
            .apply_preset(PresetId::TopHoldingsPeriodA);
        assert_eq!(state.preset_predicate(), None);
        assert_eq!(state.view(&sample()).len(), 4);
    }

    #[test]
    fn test_new_entries_view() {
        let state = FilterState::new().apply_preset(PresetId::NewEntries);
        assert_eq!(names(&state.view(&sample())), vec!["Alpha", "Delta"]);
    }

    #[test]
    fn test_absent_values_sort_last_both_ways() {
        let dataset = sample();
        let mut state = FilterState::new();
        state.set_sort(Some(SortSpec::new(
            Column::MarketValuePctPeriodA,
            SortDirection::Descending,
        )));
        assert_eq!(
            names(&state.view(&dataset)),
            vec!["Beta", "Alpha", "Delta", "Gamma"]
        );
        state.set_sort(Some(SortSpec::new(
            Column::MarketValuePctPeriodA,
            SortDirection::Ascending,
        )));
        assert_eq!(
            names(&state.view(&dataset)),
            vec!["Delta", "Alpha", "Beta", "Gamma"]
        );
    }

    #[test]
    fn test_column_filters_combine_with_preset() {
        let mut state = FilterState::new().apply_preset(PresetId::Increase);
        state.set_column_filter(Column::QuantityPctChange, ">20");
        assert_eq!(names(&state.view(&sample())), vec!["Alpha"]);

        state.set_column_filter(Column::QuantityPctChange, "");
        assert!(state.column_filters().is_empty());
        assert_eq!(state.view(&sample()).len(), 2);
    }

    #[test]
    fn test_text_column_filter() {
        let mut state = FilterState::new();
        state.set_column_filter(Column::Name, "ta");
        assert_eq!(names(&state.view(&sample())), vec!["Beta", "Delta"]);
        state.clear_column_filters();
        assert_eq!(state.view(&sample()).len(), 4);
    }

    #[test]
    fn test_view_does_not_mutate_dataset() {
        let dataset = sample();
        let before = dataset.holdings().to_vec();
        let _ = FilterState::initial()
            .apply_preset(PresetId::Decrease)
            .view(&dataset);
        assert_eq!(dataset.holdings(), before.as_slice());
    }

    #[test]
    fn test_paginate() {
        let dataset = sample();
        let rows: Vec<&Holding> = dataset.iter().collect();
        assert_eq!(names(paginate(&rows, 1, 3)), vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(names(paginate(&rows, 2, 3)), vec!["Delta"]);
        assert!(paginate(&rows, 3, 3).is_empty());
        assert_eq!(paginate(&rows, 0, 3).len(), 3);
        assert_eq!(page_count(4, 3), 2);
        assert_eq!(page_count(0, 10), 1);
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Descending));
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Ascending));
        assert!("up".parse::<SortDirection>().is_err());
    }
}
