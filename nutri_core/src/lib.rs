#![forbid(unsafe_code)]

//! Core nutrition and activity ledger engine for NutriVision.
//!
//! This crate provides:
//! - Domain types (meals, activities, goals, profile)
//! - The derivation engine (daily totals, net calories, goal progress)
//! - The ledger store with durable, independently fault-tolerant records
//! - Entry identifiers and share-link resolution
//! - The export projector consumed by an external document renderer
//! - Seams for the external image analysis and MET lookup services

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod ident;
pub mod derive;
pub mod storage;
pub mod store;
pub mod share;
pub mod services;
pub mod report;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use derive::{daily_totals, goal_progress, net_calories, DailyTotals, MacroKind};
pub use ident::new_entry_id;
pub use storage::{Record, StorageDir};
pub use store::{LedgerStore, PersistOutcome};
pub use share::{resolve, share_link, share_summary, ShareResolution};
pub use services::{
    build_activity, encode_image_ref, met_or_resting, FixedMet, MealAnalyzer, MetLookup,
    RESTING_MET,
};
pub use report::{project_report, ReportSection};
