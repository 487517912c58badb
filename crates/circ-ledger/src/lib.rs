//! Circulation ledger for a school library.
//!
//! This crate is the core of the system. It provides:
//! - [`CirculationLedger`] — borrow/return transitions over a record store,
//!   with per-reader loan limits and compensated multi-record commits
//! - [`CirculationConfig`] — loan policy knobs (cap and period)
//! - [`report`] — pure descriptive statistics over catalog/loan snapshots
//!
//! The ledger owns the invariants: a title's available copy count never
//! leaves `[0, total_copies]`, a reader's cached counter always matches
//! their open loans, and a loan only ever moves `Active -> Returned`.

pub mod config;
pub mod error;
pub mod ledger;
pub mod report;

pub use config::CirculationConfig;
pub use error::{LedgerError, LedgerResult};
pub use ledger::{BorrowOutcome, CirculationLedger, ReturnOutcome};
pub use report::{CategoryTrend, DashboardStats, MonthlyReport, PurchaseSuggestion};
