use chrono::{NaiveDate, Utc};
use circ_store::{LoanStore, ReaderStore, TitleStore};
use circ_types::{Loan, LoanId, Reader, ReaderId, Title, TitleDraft, TitleId};
use tracing::{debug, warn};

use crate::config::CirculationConfig;
use crate::error::{LedgerError, LedgerResult};

/// Result of a successful borrow, with the resolved records for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BorrowOutcome {
    pub loan: Loan,
    pub title: Title,
    pub reader: Reader,
}

/// Result of a successful return.
///
/// `is_overdue` / `overdue_days` are surfaced for display only; the
/// reader's lifetime overdue counter is not advanced here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReturnOutcome {
    pub loan: Loan,
    pub title: Title,
    pub reader: Reader,
    pub is_overdue: bool,
    pub overdue_days: u32,
}

/// The circulation ledger: borrow/return transitions, loan limits, and
/// catalog management over a record store collaborator.
///
/// Validation happens before any write. The multi-record commit sequences
/// (title availability, loan record, reader counter) compensate on partial
/// failure so availability and loan existence never drift apart, and every
/// availability change goes through the store's conditional updates so a
/// concurrent borrow of the last copy loses cleanly instead of driving the
/// count negative.
pub struct CirculationLedger<S> {
    store: S,
    config: CirculationConfig,
}

impl<S> CirculationLedger<S>
where
    S: TitleStore + ReaderStore + LoanStore,
{
    pub fn new(store: S) -> Self {
        Self::with_config(store, CirculationConfig::default())
    }

    pub fn with_config(store: S, config: CirculationConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CirculationConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Borrow
    // -----------------------------------------------------------------------

    /// Borrow a title today. See [`borrow_on`](Self::borrow_on).
    pub fn borrow(
        &self,
        reader_id: &str,
        reader_name: Option<&str>,
        title_query: &str,
    ) -> LedgerResult<BorrowOutcome> {
        self.borrow_on(reader_id, reader_name, title_query, today())
    }

    /// Borrow a title on an explicit date.
    ///
    /// `title_query` is either an exact ISBN or a case-insensitive substring
    /// of a title name; only titles with a copy on the shelf are considered.
    /// An unknown reader is auto-registered, which requires `reader_name`.
    pub fn borrow_on(
        &self,
        reader_id: &str,
        reader_name: Option<&str>,
        title_query: &str,
        today: NaiveDate,
    ) -> LedgerResult<BorrowOutcome> {
        let reader_id = parse_reader_id(reader_id)?;
        let title_query = title_query.trim();
        if title_query.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "a title name or ISBN is required".into(),
            ));
        }

        let registered = self.store.get_reader(&reader_id)?;
        let display_name = match (&registered, reader_name) {
            (Some(reader), _) => reader.name.clone(),
            (None, Some(name)) if !name.trim().is_empty() => name.trim().to_string(),
            (None, _) => {
                return Err(LedgerError::InvalidArgument(format!(
                    "reader {reader_id} is not registered; a display name is required"
                )))
            }
        };

        let candidate = self.resolve_available_title(title_query)?;

        let active = self.store.active_count_for(&reader_id)?;
        if active >= self.config.max_active_loans {
            return Err(LedgerError::LimitExceeded {
                limit: self.config.max_active_loans,
            });
        }

        // Commit sequence. Everything past this point mutates and must be
        // compensated on partial failure.
        let mut reader = match registered {
            Some(reader) => reader,
            None => self
                .store
                .insert_reader(Reader::new(reader_id, display_name))?,
        };

        let title = self.store.reserve_copy(&candidate.id)?;

        let loan = Loan::open(
            LoanId::new(),
            reader.id.clone(),
            reader.name.clone(),
            title.id,
            title.name.clone(),
            today,
            self.config.loan_period_days,
        );
        let loan = match self.store.insert_loan(loan) {
            Ok(loan) => loan,
            Err(err) => {
                warn!(title = %title.id, error = %err, "loan insert failed; releasing reserved copy");
                self.compensate_release(&title.id);
                return Err(err.into());
            }
        };

        reader.active_loans += 1;
        if let Err(err) = self.store.update_reader(&reader) {
            warn!(
                reader = %reader.id,
                loan = %loan.id,
                error = %err,
                "reader counter update failed; unwinding loan"
            );
            if let Err(comp) = self.store.remove_loan(&loan.id) {
                warn!(loan = %loan.id, error = %comp, "compensation failed; loan record left behind");
            }
            self.compensate_release(&title.id);
            return Err(err.into());
        }

        debug!(
            reader = %reader.id,
            title = %title.id,
            loan = %loan.id,
            due = %loan.due_on,
            "loan opened"
        );
        Ok(BorrowOutcome { loan, title, reader })
    }

    // -----------------------------------------------------------------------
    // Return
    // -----------------------------------------------------------------------

    /// Return a title today. See [`return_loan_on`](Self::return_loan_on).
    pub fn return_loan(
        &self,
        reader_id: &str,
        reader_name: Option<&str>,
        title_query: &str,
    ) -> LedgerResult<ReturnOutcome> {
        self.return_loan_on(reader_id, reader_name, title_query, today())
    }

    /// Return a title on an explicit date.
    ///
    /// Candidate titles are matched by exact ISBN or name substring with no
    /// availability filter; the returned loan is the reader's active loan
    /// among the candidates whose recorded display name contains
    /// `reader_name` (case-insensitively; absent means any).
    pub fn return_loan_on(
        &self,
        reader_id: &str,
        reader_name: Option<&str>,
        title_query: &str,
        today: NaiveDate,
    ) -> LedgerResult<ReturnOutcome> {
        let reader_id = parse_reader_id(reader_id)?;
        let title_query = title_query.trim();
        if title_query.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "a title name or ISBN is required".into(),
            ));
        }

        let candidates = self.candidate_title_ids(title_query)?;
        if candidates.is_empty() {
            return Err(LedgerError::NotFound(format!(
                "no catalog title matching '{title_query}'"
            )));
        }

        let name_filter = reader_name.unwrap_or("").trim().to_lowercase();
        let open = self
            .store
            .find_active(&reader_id, &candidates)?
            .into_iter()
            .find(|loan| loan.reader_name.to_lowercase().contains(&name_filter))
            .ok_or_else(|| {
                LedgerError::NotFound(format!(
                    "no active loan of '{title_query}' for reader {reader_id}"
                ))
            })?;

        let mut reader = self.store.get_reader(&reader_id)?.ok_or_else(|| {
            LedgerError::NotFound(format!("reader {reader_id} has no registry record"))
        })?;

        // Commit sequence with compensation: close the loan, put the copy
        // back on the shelf, then adjust the reader's counter.
        let mut loan = open.clone();
        loan.close(today);
        self.store.update_loan(&loan)?;

        let title = match self.store.release_copy(&loan.title_id) {
            Ok(title) => title,
            Err(err) => {
                warn!(loan = %loan.id, error = %err, "copy release failed; reverting loan");
                if let Err(comp) = self.store.update_loan(&open) {
                    warn!(loan = %loan.id, error = %comp, "compensation failed; loan left closed");
                }
                return Err(err.into());
            }
        };

        reader.active_loans = reader.active_loans.saturating_sub(1);
        if let Err(err) = self.store.update_reader(&reader) {
            warn!(
                reader = %reader.id,
                loan = %loan.id,
                error = %err,
                "reader counter update failed; unwinding return"
            );
            if let Err(comp) = self.store.reserve_copy(&loan.title_id) {
                warn!(title = %loan.title_id, error = %comp, "compensation failed; shelf count out of sync");
            }
            if let Err(comp) = self.store.update_loan(&open) {
                warn!(loan = %loan.id, error = %comp, "compensation failed; loan left closed");
            }
            return Err(err.into());
        }

        let is_overdue = loan.overdue_on(today);
        let overdue_days = loan.overdue_days(today);
        debug!(
            reader = %reader.id,
            loan = %loan.id,
            overdue_days,
            "loan returned"
        );
        Ok(ReturnOutcome {
            loan,
            title,
            reader,
            is_overdue,
            overdue_days,
        })
    }

    // -----------------------------------------------------------------------
    // Catalog management
    // -----------------------------------------------------------------------

    /// Add a title to the catalog. All copies start on the shelf.
    pub fn add_title(&self, draft: TitleDraft) -> LedgerResult<Title> {
        validate_draft(&draft)?;
        let title = Title::new(TitleId::new(), draft);
        let title = self.store.insert_title(title)?;
        debug!(title = %title.id, copies = title.total_copies, "title added");
        Ok(title)
    }

    /// Edit a title's bibliographic fields and total copy count. The
    /// available count is clamped to the new total.
    pub fn edit_title(&self, id: &TitleId, draft: TitleDraft) -> LedgerResult<Title> {
        validate_draft(&draft)?;
        let mut title = self
            .store
            .get_title(id)?
            .ok_or_else(|| LedgerError::NotFound(format!("title {id}")))?;
        title.apply_edit(draft);
        self.store.update_title(&title)?;
        Ok(title)
    }

    /// Remove a title, cascading deletion of every loan that references it.
    /// Readers holding a cascaded active loan get their counter adjusted so
    /// the cached count keeps matching their remaining open loans.
    pub fn remove_title(&self, id: &TitleId) -> LedgerResult<()> {
        if self.store.get_title(id)?.is_none() {
            return Err(LedgerError::NotFound(format!("title {id}")));
        }

        let removed = self.store.remove_for_title(id)?;
        for loan in removed.iter().filter(|l| l.status.is_active()) {
            if let Some(mut reader) = self.store.get_reader(&loan.reader_id)? {
                reader.active_loans = reader.active_loans.saturating_sub(1);
                self.store.update_reader(&reader)?;
            }
        }

        self.store.remove_title(id)?;
        debug!(title = %id, cascaded = removed.len(), "title removed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lookup helpers
    // -----------------------------------------------------------------------

    /// First available title matching the query: exact ISBN first, then
    /// case-insensitive name substring.
    fn resolve_available_title(&self, query: &str) -> LedgerResult<Title> {
        if let Some(title) = self
            .store
            .find_by_isbn(query)?
            .into_iter()
            .find(Title::is_available)
        {
            return Ok(title);
        }
        self.store
            .find_by_name(query)?
            .into_iter()
            .find(Title::is_available)
            .ok_or_else(|| {
                LedgerError::NotFound(format!("no available title matching '{query}'"))
            })
    }

    /// Every title id the query could refer to, availability ignored.
    fn candidate_title_ids(&self, query: &str) -> LedgerResult<Vec<TitleId>> {
        let mut ids: Vec<TitleId> = self
            .store
            .find_by_isbn(query)?
            .into_iter()
            .map(|t| t.id)
            .collect();
        for title in self.store.find_by_name(query)? {
            if !ids.contains(&title.id) {
                ids.push(title.id);
            }
        }
        Ok(ids)
    }

    fn compensate_release(&self, title: &TitleId) {
        if let Err(comp) = self.store.release_copy(title) {
            warn!(title = %title, error = %comp, "compensation failed; shelf count out of sync");
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn parse_reader_id(raw: &str) -> LedgerResult<ReaderId> {
    ReaderId::new(raw)
        .map_err(|_| LedgerError::InvalidArgument("a reader identifier is required".into()))
}

fn validate_draft(draft: &TitleDraft) -> LedgerResult<()> {
    let required = [
        ("name", &draft.name),
        ("author", &draft.author),
        ("isbn", &draft.isbn),
        ("category", &draft.category),
        ("publisher", &draft.publisher),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(LedgerError::InvalidArgument(format!("{field} is required")));
        }
    }
    if draft.total_copies == 0 {
        return Err(LedgerError::InvalidArgument(
            "total copies must be at least 1".into(),
        ));
    }
    Ok(())
}
