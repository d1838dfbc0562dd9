use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::models::Dataset;
use crate::utils::{format_decimal, Grouping};

/// Per-period sums of the raw market values and quantities, used to check
/// the snapshot against the source statements.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationTotals {
    pub market_value_period_a: Decimal,
    pub market_value_period_b: Decimal,
    pub quantity_period_a: Decimal,
    pub quantity_period_b: Decimal,
}

impl ValidationTotals {
    /// Sum over the full dataset; absent values count as zero.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut totals = Self::default();

        for h in dataset.iter() {
            totals.market_value_period_a += to_decimal(h.market_value_period_a, &h.name);
            totals.market_value_period_b += to_decimal(h.market_value_period_b, &h.name);
            totals.quantity_period_a += to_decimal(h.quantity_period_a, &h.name);
            totals.quantity_period_b += to_decimal(h.quantity_period_b, &h.name);
        }

        debug!("Validation totals: {:?}", totals);
        totals
    }

    /// Market value in Indian grouping, at most two decimals
    pub fn display_market_value(value: Decimal) -> String {
        format_decimal(value, 2, Grouping::Indian)
    }

    /// Quantity rounded to a whole number
    pub fn display_quantity(value: Decimal) -> String {
        format_decimal(value, 0, Grouping::Western)
    }
}

fn to_decimal(value: Option<f64>, name: &str) -> Decimal {
    match value {
        None => Decimal::ZERO,
        Some(v) => Decimal::from_f64(v).unwrap_or_else(|| {
            warn!("{}: value {} is not representable, counted as zero", name, v);
            Decimal::ZERO
        }),
    }
}
