//! Midcap - mutual fund midcap holdings explorer
//!
//! This library loads a two-period snapshot (May vs August 2025) of mutual
//! fund midcap holdings, filters and sorts it with column expressions and
//! quick filter presets, and exports the full snapshot to CSV.

pub mod annotate;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod export;
pub mod filters;
pub mod models;
pub mod reports;
pub mod ui;
pub mod utils;
