use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::id::{LoanId, ReaderId, TitleId};

/// Lifecycle state of a loan.
///
/// The only transition is `Active -> Returned`, driven by a successful
/// return. A returned loan is terminal and never reopened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Active,
    Returned,
}

impl LoanStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// One borrow-to-return transaction linking a reader and a title.
///
/// The reader and title display names are denormalized onto the loan at
/// borrow time, so a loan remains legible (and matchable at return time)
/// even after catalog edits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub reader_id: ReaderId,
    pub reader_name: String,
    pub title_id: TitleId,
    pub title_name: String,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    pub returned_on: Option<NaiveDate>,
    pub status: LoanStatus,
}

impl Loan {
    /// Open a loan: due date is the borrow date plus the loan period.
    pub fn open(
        id: LoanId,
        reader_id: ReaderId,
        reader_name: impl Into<String>,
        title_id: TitleId,
        title_name: impl Into<String>,
        borrowed_on: NaiveDate,
        loan_period_days: u32,
    ) -> Self {
        Self {
            id,
            reader_id,
            reader_name: reader_name.into(),
            title_id,
            title_name: title_name.into(),
            borrowed_on,
            due_on: borrowed_on + Duration::days(i64::from(loan_period_days)),
            returned_on: None,
            status: LoanStatus::Active,
        }
    }

    /// Close the loan on the given date. Idempotence is the caller's
    /// concern: the ledger never routes a return to a closed loan.
    pub fn close(&mut self, returned_on: NaiveDate) {
        self.returned_on = Some(returned_on);
        self.status = LoanStatus::Returned;
    }

    /// Strict date comparison: a loan returned (or examined) on its due
    /// date is not overdue.
    pub fn overdue_on(&self, as_of: NaiveDate) -> bool {
        as_of > self.due_on
    }

    /// Whole days past due as of the given date; zero when not overdue.
    pub fn overdue_days(&self, as_of: NaiveDate) -> u32 {
        (as_of - self.due_on).num_days().max(0) as u32
    }
}
