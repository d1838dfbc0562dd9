use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::error::MidcapError;
use crate::filters::predicate::{CellValue, ValueKind};

/// One instrument's snapshot across the two reporting periods.
///
/// Period A is the later snapshot (August 2025), Period B the earlier one
/// (May 2025). Percentages are fractions (`0.051` means 5.1%). `None` means
/// the value was absent in the source and is never the same as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, alias = "mktvalaug%")]
    pub market_value_pct_period_a: Option<f64>,
    #[serde(default, alias = "mktvalmay%")]
    pub market_value_pct_period_b: Option<f64>,
    #[serde(default, alias = "mv%change")]
    pub market_value_pct_change: Option<f64>,
    #[serde(default, alias = "qty%change")]
    pub quantity_pct_change: Option<f64>,
    #[serde(default, alias = "numofmfaugmv")]
    pub fund_count_mv_period_a: Option<u64>,
    #[serde(default, alias = "numofmfmaymv")]
    pub fund_count_mv_period_b: Option<u64>,
    #[serde(default, alias = "numofmfaugqty")]
    pub fund_count_qty_period_a: Option<u64>,
    #[serde(default, alias = "numofmfmayqty")]
    pub fund_count_qty_period_b: Option<u64>,
    #[serde(default, alias = "mktvalaug2025")]
    pub market_value_period_a: Option<f64>,
    #[serde(default, alias = "mktvalmay2025")]
    pub market_value_period_b: Option<f64>,
    #[serde(default, alias = "qtyaug2025")]
    pub quantity_period_a: Option<f64>,
    #[serde(default, alias = "qtymay2025")]
    pub quantity_period_b: Option<f64>,
}

impl Holding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Read-only snapshot of holdings, in source order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    holdings: Vec<Holding>,
}

impl Dataset {
    pub fn new(holdings: Vec<Holding>) -> Self {
        Self { holdings }
    }

    /// Parse a JSON array of holdings.
    pub fn from_json(raw: &str) -> Result<Self> {
        let holdings: Vec<Holding> = serde_json::from_str(raw)
            .map_err(|e| MidcapError::DataError(e.to_string()))
            .context("Failed to parse holdings JSON")?;
        Ok(Self::new(holdings))
    }

    /// Load the snapshot file produced by the upstream pipeline.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Reading holdings file: {}", path.display()))?;
        let dataset = Self::from_json(&raw)
            .with_context(|| format!("Loading holdings from {}", path.display()))?;
        info!("Loaded {} holdings from {:?}", dataset.len(), path);
        Ok(dataset)
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Holding> {
        self.holdings.iter()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

/// How a column's cells are filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Case-insensitive substring match
    Text,
    /// Operator language, cell compared after ×100
    Percentage,
    /// Operator language, cell compared as is
    PlainNumeric,
}

impl ColumnKind {
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self {
            ColumnKind::Text => None,
            ColumnKind::Percentage => Some(ValueKind::Percentage),
            ColumnKind::PlainNumeric => Some(ValueKind::PlainNumeric),
        }
    }
}

/// The columns of the holdings grid, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Name,
    Comment,
    MarketValuePctPeriodA,
    MarketValuePctPeriodB,
    MarketValuePctChange,
    QuantityPctChange,
    FundCountMvPeriodA,
    FundCountMvPeriodB,
    FundCountQtyPeriodA,
    FundCountQtyPeriodB,
    MarketValuePeriodA,
    MarketValuePeriodB,
    QuantityPeriodA,
    QuantityPeriodB,
}

impl Column {
    pub const ALL: [Column; 14] = [
        Column::Name,
        Column::Comment,
        Column::MarketValuePctPeriodA,
        Column::MarketValuePctPeriodB,
        Column::MarketValuePctChange,
        Column::QuantityPctChange,
        Column::FundCountMvPeriodA,
        Column::FundCountMvPeriodB,
        Column::FundCountQtyPeriodA,
        Column::FundCountQtyPeriodB,
        Column::MarketValuePeriodA,
        Column::MarketValuePeriodB,
        Column::QuantityPeriodA,
        Column::QuantityPeriodB,
    ];

    /// Short id used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Comment => "comment",
            Column::MarketValuePctPeriodA => "mv-pct-a",
            Column::MarketValuePctPeriodB => "mv-pct-b",
            Column::MarketValuePctChange => "mv-change",
            Column::QuantityPctChange => "qty-change",
            Column::FundCountMvPeriodA => "funds-mv-a",
            Column::FundCountMvPeriodB => "funds-mv-b",
            Column::FundCountQtyPeriodA => "funds-qty-a",
            Column::FundCountQtyPeriodB => "funds-qty-b",
            Column::MarketValuePeriodA => "mv-a",
            Column::MarketValuePeriodB => "mv-b",
            Column::QuantityPeriodA => "qty-a",
            Column::QuantityPeriodB => "qty-b",
        }
    }

    /// Field name in the holdings JSON
    pub fn field(&self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Comment => "comment",
            Column::MarketValuePctPeriodA => "marketValuePctPeriodA",
            Column::MarketValuePctPeriodB => "marketValuePctPeriodB",
            Column::MarketValuePctChange => "marketValuePctChange",
            Column::QuantityPctChange => "quantityPctChange",
            Column::FundCountMvPeriodA => "fundCountMvPeriodA",
            Column::FundCountMvPeriodB => "fundCountMvPeriodB",
            Column::FundCountQtyPeriodA => "fundCountQtyPeriodA",
            Column::FundCountQtyPeriodB => "fundCountQtyPeriodB",
            Column::MarketValuePeriodA => "marketValuePeriodA",
            Column::MarketValuePeriodB => "marketValuePeriodB",
            Column::QuantityPeriodA => "quantityPeriodA",
            Column::QuantityPeriodB => "quantityPeriodB",
        }
    }

    /// Key used by the original dashboard data file
    fn legacy_field(&self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Comment => "comment",
            Column::MarketValuePctPeriodA => "mktvalaug%",
            Column::MarketValuePctPeriodB => "mktvalmay%",
            Column::MarketValuePctChange => "mv%change",
            Column::QuantityPctChange => "qty%change",
            Column::FundCountMvPeriodA => "numofmfaugmv",
            Column::FundCountMvPeriodB => "numofmfmaymv",
            Column::FundCountQtyPeriodA => "numofmfaugqty",
            Column::FundCountQtyPeriodB => "numofmfmayqty",
            Column::MarketValuePeriodA => "mktvalaug2025",
            Column::MarketValuePeriodB => "mktvalmay2025",
            Column::QuantityPeriodA => "qtyaug2025",
            Column::QuantityPeriodB => "qtymay2025",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Column::Name => "Company Name",
            Column::Comment => "Comment",
            Column::MarketValuePctPeriodA => "Mkt Val Aug %",
            Column::MarketValuePctPeriodB => "Mkt Val May %",
            Column::MarketValuePctChange => "MV % Change",
            Column::QuantityPctChange => "Qty % Change",
            Column::FundCountMvPeriodA => "MF Aug MV",
            Column::FundCountMvPeriodB => "MF May MV",
            Column::FundCountQtyPeriodA => "MF Aug Qty",
            Column::FundCountQtyPeriodB => "MF May Qty",
            Column::MarketValuePeriodA => "Mkt Val Aug 2025",
            Column::MarketValuePeriodB => "Mkt Val May 2025",
            Column::QuantityPeriodA => "Qty Aug 2025",
            Column::QuantityPeriodB => "Qty May 2025",
        }
    }

    /// Legend text shown by the `legend` command
    pub fn description(&self) -> &'static str {
        match self {
            Column::Name => "Standardized instrument/company name.",
            Column::Comment => "Special comments (Bonus, Split, Rights, etc.).",
            Column::MarketValuePctPeriodA => "Fraction of total August 2025 market value.",
            Column::MarketValuePctPeriodB => {
                "Fraction of total May 2025 market value (e.g., 0.25 = 25%)."
            }
            Column::MarketValuePctChange => {
                "Relative change in market value between August and May."
            }
            Column::QuantityPctChange => "Relative change in quantity between August and May.",
            Column::FundCountMvPeriodA => {
                "Count of mutual funds holding it in August (by market value > 0)."
            }
            Column::FundCountMvPeriodB => {
                "Count of mutual funds holding it in May (by market value > 0)."
            }
            Column::FundCountQtyPeriodA => {
                "Count of mutual funds holding it in August (by quantity > 0)."
            }
            Column::FundCountQtyPeriodB => {
                "Count of mutual funds holding it in May (by quantity > 0)."
            }
            Column::MarketValuePeriodA => "Raw total market value in August 2025.",
            Column::MarketValuePeriodB => "Raw total market value in May 2025.",
            Column::QuantityPeriodA => "Raw total quantity in August 2025.",
            Column::QuantityPeriodB => "Raw total quantity in May 2025.",
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Name | Column::Comment => ColumnKind::Text,
            Column::MarketValuePctPeriodA
            | Column::MarketValuePctPeriodB
            | Column::MarketValuePctChange
            | Column::QuantityPctChange => ColumnKind::Percentage,
            _ => ColumnKind::PlainNumeric,
        }
    }

    /// Raw cell of this column for one holding
    pub fn cell<'a>(&self, holding: &'a Holding) -> CellValue<'a> {
        fn num(v: Option<f64>) -> CellValue<'static> {
            v.map_or(CellValue::Empty, CellValue::Number)
        }
        fn count(v: Option<u64>) -> CellValue<'static> {
            v.map_or(CellValue::Empty, |c| CellValue::Number(c as f64))
        }

        match self {
            Column::Name => CellValue::Text(&holding.name),
            Column::Comment => holding
                .comment
                .as_deref()
                .map_or(CellValue::Empty, CellValue::Text),
            Column::MarketValuePctPeriodA => num(holding.market_value_pct_period_a),
            Column::MarketValuePctPeriodB => num(holding.market_value_pct_period_b),
            Column::MarketValuePctChange => num(holding.market_value_pct_change),
            Column::QuantityPctChange => num(holding.quantity_pct_change),
            Column::FundCountMvPeriodA => count(holding.fund_count_mv_period_a),
            Column::FundCountMvPeriodB => count(holding.fund_count_mv_period_b),
            Column::FundCountQtyPeriodA => count(holding.fund_count_qty_period_a),
            Column::FundCountQtyPeriodB => count(holding.fund_count_qty_period_b),
            Column::MarketValuePeriodA => num(holding.market_value_period_a),
            Column::MarketValuePeriodB => num(holding.market_value_period_b),
            Column::QuantityPeriodA => num(holding.quantity_period_a),
            Column::QuantityPeriodB => num(holding.quantity_period_b),
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = MidcapError;

    /// Accepts the short id, the JSON field name, or the legacy data key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Column::ALL
            .iter()
            .copied()
            .find(|c| {
                c.as_str().eq_ignore_ascii_case(needle)
                    || c.field().eq_ignore_ascii_case(needle)
                    || c.legacy_field().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| MidcapError::UnknownColumn(needle.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_keeps_null_distinct_from_zero() {
        let raw = r#"[
            {"name": "Alpha", "marketValuePctPeriodA": 0.02, "marketValuePctPeriodB": null},
            {"name": "Beta", "marketValuePctPeriodA": 0.0}
        ]"#;
        let dataset = Dataset::from_json(raw).unwrap();
        assert_eq!(dataset.len(), 2);
        let alpha = &dataset.holdings()[0];
        assert_eq!(alpha.market_value_pct_period_a, Some(0.02));
        assert_eq!(alpha.market_value_pct_period_b, None);
        let beta = &dataset.holdings()[1];
        assert_eq!(beta.market_value_pct_period_a, Some(0.0));
        assert_eq!(beta.comment, None);
    }

    #[test]
    fn test_deserialize_accepts_legacy_keys() {
        let raw = r#"[{
            "name": "Dixon Tech",
            "comment": "Split",
            "mktvalaug%": 0.031,
            "mktvalmay%": 0.029,
            "qty%change": -0.12,
            "numofmfaugmv": 41,
            "mktvalmay2025": 79718
        }]"#;
        let dataset = Dataset::from_json(raw).unwrap();
        let h = &dataset.holdings()[0];
        assert_eq!(h.market_value_pct_period_a, Some(0.031));
        assert_eq!(h.market_value_pct_period_b, Some(0.029));
        assert_eq!(h.quantity_pct_change, Some(-0.12));
        assert_eq!(h.fund_count_mv_period_a, Some(41));
        assert_eq!(h.market_value_period_b, Some(79718.0));
        assert_eq!(h.comment.as_deref(), Some("Split"));
    }

    #[test]
    fn test_invalid_json_is_a_data_error() {
        let err = Dataset::from_json("{not json").unwrap_err();
        assert!(format!("{:?}", err).contains("data error"));
    }

    #[test]
    fn test_column_from_str_variants() {
        assert_eq!("mv-pct-a".parse::<Column>().unwrap(), Column::MarketValuePctPeriodA);
        assert_eq!(
            "quantityPctChange".parse::<Column>().unwrap(),
            Column::QuantityPctChange
        );
        assert_eq!("qtymay2025".parse::<Column>().unwrap(), Column::QuantityPeriodB);
        assert!(matches!(
            "bogus".parse::<Column>(),
            Err(MidcapError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_column_kinds() {
        assert_eq!(Column::Name.kind(), ColumnKind::Text);
        assert_eq!(Column::QuantityPctChange.kind(), ColumnKind::Percentage);
        assert_eq!(Column::FundCountMvPeriodB.kind(), ColumnKind::PlainNumeric);
        assert_eq!(Column::MarketValuePeriodA.kind(), ColumnKind::PlainNumeric);
    }

    #[test]
    fn test_cell_reports_absence() {
        let mut h = Holding::new("Gamma");
        h.fund_count_qty_period_a = Some(7);
        assert_eq!(Column::Name.cell(&h), CellValue::Text("Gamma"));
        assert_eq!(Column::Comment.cell(&h), CellValue::Empty);
        assert_eq!(Column::FundCountQtyPeriodA.cell(&h), CellValue::Number(7.0));
        assert_eq!(Column::QuantityPeriodB.cell(&h), CellValue::Empty);
    }
}
