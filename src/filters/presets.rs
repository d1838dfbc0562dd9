//! Quick filter presets
//!
//! Each preset is a one-click combination of a forced sort and an optional
//! row predicate. Presets do not compose: applying one replaces whatever
//! preset predicate was installed before.

use std::fmt;
use std::str::FromStr;

use crate::error::MidcapError;
use crate::filters::{SortDirection, SortSpec};
use crate::models::{Column, Holding};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetId {
    TopHoldingsPeriodA,
    TopHoldingsPeriodB,
    Increase,
    Decrease,
    NewEntries,
    Exits,
    Clear,
}

impl PresetId {
    pub const ALL: [PresetId; 7] = [
        PresetId::TopHoldingsPeriodA,
        PresetId::TopHoldingsPeriodB,
        PresetId::Increase,
        PresetId::Decrease,
        PresetId::NewEntries,
        PresetId::Exits,
        PresetId::Clear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetId::TopHoldingsPeriodA => "top-holdings-periodA",
            PresetId::TopHoldingsPeriodB => "top-holdings-periodB",
            PresetId::Increase => "increase",
            PresetId::Decrease => "decrease",
            PresetId::NewEntries => "new-entries",
            PresetId::Exits => "exits",
            PresetId::Clear => "clear",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PresetId::TopHoldingsPeriodA => "Top holdings (Aug)",
            PresetId::TopHoldingsPeriodB => "Top holdings (May)",
            PresetId::Increase => "Quantity increased",
            PresetId::Decrease => "Quantity decreased",
            PresetId::NewEntries => "New entries",
            PresetId::Exits => "Exits",
            PresetId::Clear => "Clear quick filter",
        }
    }

    /// The declarative (sort, predicate) pair this preset installs.
    pub fn apply(&self) -> PresetOutcome {
        let desc = |column| Some(SortSpec::new(column, SortDirection::Descending));

        match self {
            PresetId::TopHoldingsPeriodA => PresetOutcome {
                sort: desc(Column::MarketValuePctPeriodA),
                predicate: None,
            },
            PresetId::TopHoldingsPeriodB => PresetOutcome {
                sort: desc(Column::MarketValuePctPeriodB),
                predicate: None,
            },
            PresetId::Increase => PresetOutcome {
                sort: desc(Column::QuantityPctChange),
                predicate: Some(PresetPredicate::QuantityIncrease),
            },
            PresetId::Decrease => PresetOutcome {
                sort: Some(SortSpec::new(
                    Column::QuantityPctChange,
                    SortDirection::Ascending,
                )),
                predicate: Some(PresetPredicate::QuantityDecrease),
            },
            PresetId::NewEntries => PresetOutcome {
                sort: desc(Column::MarketValuePctPeriodA),
                predicate: Some(PresetPredicate::NewEntries),
            },
            PresetId::Exits => PresetOutcome {
                sort: desc(Column::MarketValuePctPeriodB),
                predicate: Some(PresetPredicate::Exits),
            },
            PresetId::Clear => PresetOutcome {
                sort: None,
                predicate: None,
            },
        }
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetId {
    type Err = MidcapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        match key.as_str() {
            "top-holdings-perioda" | "top-holdings-aug" => Ok(PresetId::TopHoldingsPeriodA),
            "top-holdings-periodb" | "top-holdings-may" => Ok(PresetId::TopHoldingsPeriodB),
            "increase" => Ok(PresetId::Increase),
            "decrease" => Ok(PresetId::Decrease),
            "new-entries" => Ok(PresetId::NewEntries),
            "exits" => Ok(PresetId::Exits),
            "clear" => Ok(PresetId::Clear),
            _ => Err(MidcapError::UnknownPreset(s.trim().to_string())),
        }
    }
}

/// Sort to force (`None` leaves the current sort alone) and predicate to
/// install (`None` removes the preset predicate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetOutcome {
    pub sort: Option<SortSpec>,
    pub predicate: Option<PresetPredicate>,
}

/// Row predicates installed by presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetPredicate {
    /// quantityPctChange > 0
    QuantityIncrease,
    /// quantityPctChange < 0
    QuantityDecrease,
    /// Held in Period A, absent or zero in Period B
    NewEntries,
    /// Held in Period B, absent or zero in Period A
    Exits,
}

impl PresetPredicate {
    pub fn matches(&self, holding: &Holding) -> bool {
        match self {
            PresetPredicate::QuantityIncrease => {
                holding.quantity_pct_change.is_some_and(|v| v > 0.0)
            }
            PresetPredicate::QuantityDecrease => {
                holding.quantity_pct_change.is_some_and(|v| v < 0.0)
            }
            PresetPredicate::NewEntries => {
                held(holding.market_value_pct_period_a)
                    && not_held(holding.market_value_pct_period_b)
            }
            PresetPredicate::Exits => {
                held(holding.market_value_pct_period_b)
                    && not_held(holding.market_value_pct_period_a)
            }
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            PresetPredicate::QuantityIncrease => "quantityPctChange > 0",
            PresetPredicate::QuantityDecrease => "quantityPctChange < 0",
            PresetPredicate::NewEntries => {
                "marketValuePctPeriodA > 0 AND marketValuePctPeriodB is absent or 0"
            }
            PresetPredicate::Exits => {
                "marketValuePctPeriodB > 0 AND marketValuePctPeriodA is absent or 0"
            }
        }
    }
}

fn held(share: Option<f64>) -> bool {
    share.is_some_and(|v| v > 0.0)
}

// Absence and an explicit zero both count as "not held".
fn not_held(share: Option<f64>) -> bool {
    share.is_none_or(|v| v == 0.0)
}
