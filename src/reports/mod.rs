// Reports module - summaries computed over the full snapshot

pub mod totals;

pub use totals::ValidationTotals;
