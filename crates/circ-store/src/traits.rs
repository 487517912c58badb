use circ_types::{Announcement, Loan, LoanId, Reader, ReaderId, Title, TitleId};

use crate::error::StoreResult;

/// Catalog store boundary.
///
/// Besides plain CRUD and the two filter queries the ledger resolves titles
/// with, this trait carries the conditional copy-count updates. Availability
/// changes go through `reserve_copy` / `release_copy` so that the
/// check-and-mutate happens inside the store, not in the caller: two racing
/// reservations against the last copy must yield exactly one success.
pub trait TitleStore: Send + Sync {
    fn list_titles(&self) -> StoreResult<Vec<Title>>;

    /// Returns `Ok(None)` if the title does not exist.
    fn get_title(&self, id: &TitleId) -> StoreResult<Option<Title>>;

    /// Insert a new title. Fails with `DuplicateId` if the id is taken.
    fn insert_title(&self, title: Title) -> StoreResult<Title>;

    /// Replace an existing title record. Fails with `NotFound` if missing.
    fn update_title(&self, title: &Title) -> StoreResult<()>;

    /// Delete a title. Returns `true` if the title existed.
    fn remove_title(&self, id: &TitleId) -> StoreResult<bool>;

    /// Exact-equality ISBN lookup.
    fn find_by_isbn(&self, isbn: &str) -> StoreResult<Vec<Title>>;

    /// Case-insensitive substring match against title names.
    fn find_by_name(&self, query: &str) -> StoreResult<Vec<Title>>;

    /// Decrement the available copy count if it is positive, refreshing the
    /// cached shelf status, and return the updated record. Fails with
    /// `CopiesExhausted` when no copy is left.
    fn reserve_copy(&self, id: &TitleId) -> StoreResult<Title>;

    /// Increment the available copy count, clamped at the total, refreshing
    /// the cached shelf status, and return the updated record.
    fn release_copy(&self, id: &TitleId) -> StoreResult<Title>;
}

/// Reader registry boundary. Readers are inserted on first borrow and
/// updated in place; the ledger never deletes them.
pub trait ReaderStore: Send + Sync {
    fn list_readers(&self) -> StoreResult<Vec<Reader>>;

    fn get_reader(&self, id: &ReaderId) -> StoreResult<Option<Reader>>;

    fn insert_reader(&self, reader: Reader) -> StoreResult<Reader>;

    fn update_reader(&self, reader: &Reader) -> StoreResult<()>;
}

/// Loan record boundary.
pub trait LoanStore: Send + Sync {
    fn list_loans(&self) -> StoreResult<Vec<Loan>>;

    fn get_loan(&self, id: &LoanId) -> StoreResult<Option<Loan>>;

    fn insert_loan(&self, loan: Loan) -> StoreResult<Loan>;

    fn update_loan(&self, loan: &Loan) -> StoreResult<()>;

    fn remove_loan(&self, id: &LoanId) -> StoreResult<bool>;

    /// Number of the reader's loans still out.
    fn active_count_for(&self, reader: &ReaderId) -> StoreResult<u32>;

    /// The reader's active loans whose title is among the candidates.
    fn find_active(&self, reader: &ReaderId, titles: &[TitleId]) -> StoreResult<Vec<Loan>>;

    /// Delete every loan referencing the title and return the removed
    /// records. Cascade support for title removal.
    fn remove_for_title(&self, title: &TitleId) -> StoreResult<Vec<Loan>>;
}

/// Announcement board boundary.
pub trait AnnouncementStore: Send + Sync {
    /// All announcements, newest first.
    fn list_announcements(&self) -> StoreResult<Vec<Announcement>>;

    /// The `limit` most recent announcements.
    fn latest_announcements(&self, limit: usize) -> StoreResult<Vec<Announcement>>;

    fn insert_announcement(&self, announcement: Announcement) -> StoreResult<Announcement>;
}
