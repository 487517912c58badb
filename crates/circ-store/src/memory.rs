use std::collections::BTreeMap;
use std::sync::RwLock;

use circ_types::{Announcement, Loan, LoanId, Reader, ReaderId, Title, TitleId};

use crate::error::{StoreError, StoreResult};
use crate::traits::{AnnouncementStore, LoanStore, ReaderStore, TitleStore};

/// In-memory record store for tests, local demos, and embedding.
///
/// All four entity collections live behind a single `RwLock`, so every
/// operation sees a consistent snapshot and the conditional copy-count
/// updates hold the write lock for the whole check-and-mutate. Records are
/// cloned on read.
pub struct InMemoryLibrary {
    inner: RwLock<LibraryState>,
}

#[derive(Default)]
struct LibraryState {
    titles: BTreeMap<TitleId, Title>,
    readers: BTreeMap<ReaderId, Reader>,
    loans: BTreeMap<LoanId, Loan>,
    announcements: Vec<Announcement>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LibraryState::default()),
        }
    }

    /// Returns `true` if no records of any kind are stored.
    pub fn is_empty(&self) -> bool {
        let state = self.inner.read().expect("lock poisoned");
        state.titles.is_empty()
            && state.readers.is_empty()
            && state.loans.is_empty()
            && state.announcements.is_empty()
    }

    /// Remove every record.
    pub fn clear(&self) {
        let mut state = self.inner.write().expect("lock poisoned");
        *state = LibraryState::default();
    }
}

impl Default for InMemoryLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.read().expect("lock poisoned");
        f.debug_struct("InMemoryLibrary")
            .field("titles", &state.titles.len())
            .field("readers", &state.readers.len())
            .field("loans", &state.loans.len())
            .field("announcements", &state.announcements.len())
            .finish()
    }
}

impl TitleStore for InMemoryLibrary {
    fn list_titles(&self) -> StoreResult<Vec<Title>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.titles.values().cloned().collect())
    }

    fn get_title(&self, id: &TitleId) -> StoreResult<Option<Title>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.titles.get(id).cloned())
    }

    fn insert_title(&self, title: Title) -> StoreResult<Title> {
        let mut state = self.inner.write().expect("lock poisoned");
        if state.titles.contains_key(&title.id) {
            return Err(StoreError::DuplicateId(title.id.to_string()));
        }
        state.titles.insert(title.id, title.clone());
        Ok(title)
    }

    fn update_title(&self, title: &Title) -> StoreResult<()> {
        let mut state = self.inner.write().expect("lock poisoned");
        match state.titles.get_mut(&title.id) {
            Some(slot) => {
                *slot = title.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(title.id.to_string())),
        }
    }

    fn remove_title(&self, id: &TitleId) -> StoreResult<bool> {
        let mut state = self.inner.write().expect("lock poisoned");
        Ok(state.titles.remove(id).is_some())
    }

    fn find_by_isbn(&self, isbn: &str) -> StoreResult<Vec<Title>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .titles
            .values()
            .filter(|t| t.isbn == isbn)
            .cloned()
            .collect())
    }

    fn find_by_name(&self, query: &str) -> StoreResult<Vec<Title>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .titles
            .values()
            .filter(|t| t.name_contains(query))
            .cloned()
            .collect())
    }

    fn reserve_copy(&self, id: &TitleId) -> StoreResult<Title> {
        let mut state = self.inner.write().expect("lock poisoned");
        let title = state
            .titles
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if title.available_copies == 0 {
            return Err(StoreError::CopiesExhausted(*id));
        }
        title.available_copies -= 1;
        title.refresh_availability();
        Ok(title.clone())
    }

    fn release_copy(&self, id: &TitleId) -> StoreResult<Title> {
        let mut state = self.inner.write().expect("lock poisoned");
        let title = state
            .titles
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        // Clamp rather than fail: a release against a full shelf is a
        // bookkeeping echo, not an error.
        title.available_copies = (title.available_copies + 1).min(title.total_copies);
        title.refresh_availability();
        Ok(title.clone())
    }
}

impl ReaderStore for InMemoryLibrary {
    fn list_readers(&self) -> StoreResult<Vec<Reader>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.readers.values().cloned().collect())
    }

    fn get_reader(&self, id: &ReaderId) -> StoreResult<Option<Reader>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.readers.get(id).cloned())
    }

    fn insert_reader(&self, reader: Reader) -> StoreResult<Reader> {
        let mut state = self.inner.write().expect("lock poisoned");
        if state.readers.contains_key(&reader.id) {
            return Err(StoreError::DuplicateId(reader.id.to_string()));
        }
        state.readers.insert(reader.id.clone(), reader.clone());
        Ok(reader)
    }

    fn update_reader(&self, reader: &Reader) -> StoreResult<()> {
        let mut state = self.inner.write().expect("lock poisoned");
        match state.readers.get_mut(&reader.id) {
            Some(slot) => {
                *slot = reader.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(reader.id.to_string())),
        }
    }
}

impl LoanStore for InMemoryLibrary {
    fn list_loans(&self) -> StoreResult<Vec<Loan>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.loans.values().cloned().collect())
    }

    fn get_loan(&self, id: &LoanId) -> StoreResult<Option<Loan>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.loans.get(id).cloned())
    }

    fn insert_loan(&self, loan: Loan) -> StoreResult<Loan> {
        let mut state = self.inner.write().expect("lock poisoned");
        if state.loans.contains_key(&loan.id) {
            return Err(StoreError::DuplicateId(loan.id.to_string()));
        }
        state.loans.insert(loan.id, loan.clone());
        Ok(loan)
    }

    fn update_loan(&self, loan: &Loan) -> StoreResult<()> {
        let mut state = self.inner.write().expect("lock poisoned");
        match state.loans.get_mut(&loan.id) {
            Some(slot) => {
                *slot = loan.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(loan.id.to_string())),
        }
    }

    fn remove_loan(&self, id: &LoanId) -> StoreResult<bool> {
        let mut state = self.inner.write().expect("lock poisoned");
        Ok(state.loans.remove(id).is_some())
    }

    fn active_count_for(&self, reader: &ReaderId) -> StoreResult<u32> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .loans
            .values()
            .filter(|l| l.status.is_active() && &l.reader_id == reader)
            .count() as u32)
    }

    fn find_active(&self, reader: &ReaderId, titles: &[TitleId]) -> StoreResult<Vec<Loan>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .loans
            .values()
            .filter(|l| {
                l.status.is_active() && &l.reader_id == reader && titles.contains(&l.title_id)
            })
            .cloned()
            .collect())
    }

    fn remove_for_title(&self, title: &TitleId) -> StoreResult<Vec<Loan>> {
        let mut state = self.inner.write().expect("lock poisoned");
        let doomed: Vec<LoanId> = state
            .loans
            .values()
            .filter(|l| &l.title_id == title)
            .map(|l| l.id)
            .collect();
        let mut removed = Vec::with_capacity(doomed.len());
        for id in doomed {
            if let Some(loan) = state.loans.remove(&id) {
                removed.push(loan);
            }
        }
        Ok(removed)
    }
}

impl AnnouncementStore for InMemoryLibrary {
    fn list_announcements(&self) -> StoreResult<Vec<Announcement>> {
        let state = self.inner.read().expect("lock poisoned");
        let mut all = state.announcements.clone();
        all.sort_by(|a, b| b.published_on.cmp(&a.published_on).then(b.id.cmp(&a.id)));
        Ok(all)
    }

    fn latest_announcements(&self, limit: usize) -> StoreResult<Vec<Announcement>> {
        let mut all = self.list_announcements()?;
        all.truncate(limit);
        Ok(all)
    }

    fn insert_announcement(&self, announcement: Announcement) -> StoreResult<Announcement> {
        let mut state = self.inner.write().expect("lock poisoned");
        state.announcements.push(announcement.clone());
        Ok(announcement)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use circ_types::{LoanStatus, TitleDraft};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn title(name: &str, isbn: &str, total: u32) -> Title {
        Title::new(
            TitleId::new(),
            TitleDraft {
                name: name.into(),
                author: "A. Author".into(),
                isbn: isbn.into(),
                category: "Fiction".into(),
                publisher: "Example Press".into(),
                total_copies: total,
            },
        )
    }

    fn reader(id: &str, name: &str) -> Reader {
        Reader::new(ReaderId::new(id).unwrap(), name)
    }

    fn loan(reader_id: &str, title: &Title, borrowed: NaiveDate) -> Loan {
        Loan::open(
            LoanId::new(),
            ReaderId::new(reader_id).unwrap(),
            "Mara Lin",
            title.id,
            title.name.clone(),
            borrowed,
            30,
        )
    }

    // -----------------------------------------------------------------------
    // Title CRUD and queries
    // -----------------------------------------------------------------------

    #[test]
    fn insert_and_get_title() {
        let store = InMemoryLibrary::new();
        let t = store.insert_title(title("Dune", "isbn-1", 3)).unwrap();
        let got = store.get_title(&t.id).unwrap().expect("should exist");
        assert_eq!(got, t);
    }

    #[test]
    fn duplicate_title_insert_is_rejected() {
        let store = InMemoryLibrary::new();
        let t = store.insert_title(title("Dune", "isbn-1", 3)).unwrap();
        let err = store.insert_title(t).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(_)));
    }

    #[test]
    fn update_missing_title_fails() {
        let store = InMemoryLibrary::new();
        let t = title("Dune", "isbn-1", 3);
        assert!(matches!(
            store.update_title(&t).unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[test]
    fn remove_title_reports_presence() {
        let store = InMemoryLibrary::new();
        let t = store.insert_title(title("Dune", "isbn-1", 3)).unwrap();
        assert!(store.remove_title(&t.id).unwrap());
        assert!(!store.remove_title(&t.id).unwrap());
        assert!(store.get_title(&t.id).unwrap().is_none());
    }

    #[test]
    fn isbn_lookup_is_exact() {
        let store = InMemoryLibrary::new();
        store.insert_title(title("Dune", "isbn-1", 3)).unwrap();
        store.insert_title(title("Emma", "isbn-2", 1)).unwrap();

        let hits = store.find_by_isbn("isbn-1").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Dune");
        assert!(store.find_by_isbn("isbn").unwrap().is_empty());
    }

    #[test]
    fn name_lookup_is_case_insensitive_substring() {
        let store = InMemoryLibrary::new();
        store
            .insert_title(title("The Little Prince", "isbn-1", 1))
            .unwrap();
        store.insert_title(title("Little Women", "isbn-2", 1)).unwrap();
        store.insert_title(title("Dune", "isbn-3", 1)).unwrap();

        let hits = store.find_by_name("LITTLE").unwrap();
        assert_eq!(hits.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Conditional copy-count updates
    // -----------------------------------------------------------------------

    #[test]
    fn reserve_decrements_until_exhausted() {
        let store = InMemoryLibrary::new();
        let t = store.insert_title(title("Dune", "isbn-1", 2)).unwrap();

        let after = store.reserve_copy(&t.id).unwrap();
        assert_eq!(after.available_copies, 1);
        assert!(after.is_available());

        let after = store.reserve_copy(&t.id).unwrap();
        assert_eq!(after.available_copies, 0);
        assert!(!after.is_available());

        assert_eq!(
            store.reserve_copy(&t.id).unwrap_err(),
            StoreError::CopiesExhausted(t.id)
        );
        // The failed reservation changed nothing.
        assert_eq!(store.get_title(&t.id).unwrap().unwrap().available_copies, 0);
    }

    #[test]
    fn release_clamps_at_total() {
        let store = InMemoryLibrary::new();
        let t = store.insert_title(title("Dune", "isbn-1", 2)).unwrap();

        store.reserve_copy(&t.id).unwrap();
        let after = store.release_copy(&t.id).unwrap();
        assert_eq!(after.available_copies, 2);

        // Release against a full shelf is clamped, not an error.
        let after = store.release_copy(&t.id).unwrap();
        assert_eq!(after.available_copies, 2);
    }

    #[test]
    fn reserve_missing_title_fails() {
        let store = InMemoryLibrary::new();
        assert!(matches!(
            store.reserve_copy(&TitleId::new()).unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[test]
    fn racing_reservations_on_last_copy_admit_one_winner() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryLibrary::new());
        let t = store.insert_title(title("Dune", "isbn-1", 1)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = t.id;
                thread::spawn(move || store.reserve_copy(&id).is_ok())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .filter(|&won| won)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(store.get_title(&t.id).unwrap().unwrap().available_copies, 0);
    }

    // -----------------------------------------------------------------------
    // Readers
    // -----------------------------------------------------------------------

    #[test]
    fn reader_insert_update_get() {
        let store = InMemoryLibrary::new();
        let mut r = store.insert_reader(reader("S1", "Mara Lin")).unwrap();

        r.active_loans = 2;
        store.update_reader(&r).unwrap();
        assert_eq!(
            store.get_reader(&r.id).unwrap().unwrap().active_loans,
            2
        );
    }

    #[test]
    fn duplicate_reader_insert_is_rejected() {
        let store = InMemoryLibrary::new();
        store.insert_reader(reader("S1", "Mara Lin")).unwrap();
        let err = store.insert_reader(reader("S1", "Other")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(_)));
    }

    // -----------------------------------------------------------------------
    // Loans
    // -----------------------------------------------------------------------

    #[test]
    fn active_count_ignores_returned_loans() {
        let store = InMemoryLibrary::new();
        let t = store.insert_title(title("Dune", "isbn-1", 3)).unwrap();
        let reader_id = ReaderId::new("S1").unwrap();

        let open = store.insert_loan(loan("S1", &t, date(2025, 3, 1))).unwrap();
        let mut closed = store.insert_loan(loan("S1", &t, date(2025, 2, 1))).unwrap();
        closed.close(date(2025, 2, 20));
        store.update_loan(&closed).unwrap();
        store.insert_loan(loan("S2", &t, date(2025, 3, 1))).unwrap();

        assert_eq!(store.active_count_for(&reader_id).unwrap(), 1);
        let active = store.find_active(&reader_id, &[t.id]).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, open.id);
    }

    #[test]
    fn find_active_filters_by_title_candidates() {
        let store = InMemoryLibrary::new();
        let dune = store.insert_title(title("Dune", "isbn-1", 3)).unwrap();
        let emma = store.insert_title(title("Emma", "isbn-2", 3)).unwrap();
        let reader_id = ReaderId::new("S1").unwrap();

        store.insert_loan(loan("S1", &dune, date(2025, 3, 1))).unwrap();
        store.insert_loan(loan("S1", &emma, date(2025, 3, 1))).unwrap();

        let hits = store.find_active(&reader_id, &[emma.id]).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title_id, emma.id);
        assert!(store.find_active(&reader_id, &[]).unwrap().is_empty());
    }

    #[test]
    fn remove_for_title_cascades_and_reports() {
        let store = InMemoryLibrary::new();
        let dune = store.insert_title(title("Dune", "isbn-1", 3)).unwrap();
        let emma = store.insert_title(title("Emma", "isbn-2", 3)).unwrap();

        store.insert_loan(loan("S1", &dune, date(2025, 3, 1))).unwrap();
        store.insert_loan(loan("S2", &dune, date(2025, 3, 2))).unwrap();
        let kept = store.insert_loan(loan("S1", &emma, date(2025, 3, 3))).unwrap();

        let removed = store.remove_for_title(&dune.id).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(removed.iter().all(|l| l.title_id == dune.id));

        let remaining = store.list_loans().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept.id);
    }

    #[test]
    fn returned_loans_survive_status_round_trip() {
        let store = InMemoryLibrary::new();
        let t = store.insert_title(title("Dune", "isbn-1", 1)).unwrap();
        let mut l = store.insert_loan(loan("S1", &t, date(2025, 3, 1))).unwrap();

        l.close(date(2025, 3, 15));
        store.update_loan(&l).unwrap();

        let got = store.get_loan(&l.id).unwrap().unwrap();
        assert_eq!(got.status, LoanStatus::Returned);
        assert_eq!(got.returned_on, Some(date(2025, 3, 15)));
    }

    // -----------------------------------------------------------------------
    // Announcements
    // -----------------------------------------------------------------------

    #[test]
    fn announcements_list_newest_first() {
        let store = InMemoryLibrary::new();
        store
            .insert_announcement(Announcement::new("Old", "…", date(2025, 1, 1)))
            .unwrap();
        store
            .insert_announcement(Announcement::new("New", "…", date(2025, 3, 1)))
            .unwrap();
        store
            .insert_announcement(Announcement::new("Mid", "…", date(2025, 2, 1)))
            .unwrap();

        let all = store.list_announcements().unwrap();
        let titles: Vec<_> = all.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["New", "Mid", "Old"]);

        let latest = store.latest_announcements(2).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].title, "New");
    }

    // -----------------------------------------------------------------------
    // Housekeeping
    // -----------------------------------------------------------------------

    #[test]
    fn clear_empties_every_collection() {
        let store = InMemoryLibrary::new();
        assert!(store.is_empty());

        store.insert_title(title("Dune", "isbn-1", 1)).unwrap();
        store.insert_reader(reader("S1", "Mara Lin")).unwrap();
        assert!(!store.is_empty());

        store.clear();
        assert!(store.is_empty());
    }
}
