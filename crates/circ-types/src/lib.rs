//! Foundation types for the circulation ledger.
//!
//! This crate provides the identifier, catalog, and loan record types used
//! throughout the system. Every other circ crate depends on `circ-types`.
//!
//! # Key Types
//!
//! - [`TitleId`] / [`LoanId`] / [`AnnouncementId`] — UUID v7 record identifiers
//! - [`ReaderId`] — externally issued borrower identifier (student/card number)
//! - [`Title`] — a catalog entry with a circulating copy count
//! - [`Reader`] — a registered borrower with cached loan counters
//! - [`Loan`] — one borrow-to-return transaction
//! - [`Announcement`] — a dated notice on the library board

pub mod announcement;
pub mod error;
pub mod id;
pub mod loan;
pub mod reader;
pub mod title;

pub use announcement::Announcement;
pub use error::TypeError;
pub use id::{AnnouncementId, LoanId, ReaderId, TitleId};
pub use loan::{Loan, LoanStatus};
pub use reader::Reader;
pub use title::{Availability, Title, TitleDraft};
