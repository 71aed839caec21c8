//! Fulfillment Fee Estimation Engine for Marketplace Catalogs
//!
//! This crate classifies catalog items into marketplace size categories
//! (US 2024, US 2026 and European regimes), resolves their billing weight,
//! and looks up fulfillment, removal and multi-channel fees from seller-side
//! rate tables.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
