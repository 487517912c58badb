use serde::{Deserialize, Serialize};

use crate::id::ReaderId;

/// A registered borrower.
///
/// Readers are auto-registered on first borrow and never deleted by the
/// ledger. `active_loans` is a cached mirror of the reader's open loans;
/// `overdue_count` is a lifetime counter maintained outside the return path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reader {
    pub id: ReaderId,
    pub name: String,
    pub active_loans: u32,
    pub overdue_count: u32,
}

impl Reader {
    /// Register a reader with zero counters.
    pub fn new(id: ReaderId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            active_loans: 0,
            overdue_count: 0,
        }
    }

    /// Case-insensitive substring match against the display name.
    pub fn name_contains(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_reader_starts_with_zero_counters() {
        let r = Reader::new(ReaderId::new("S1").unwrap(), "Mara Lin");
        assert_eq!(r.active_loans, 0);
        assert_eq!(r.overdue_count, 0);
    }

    #[test]
    fn display_name_match_ignores_case() {
        let r = Reader::new(ReaderId::new("S1").unwrap(), "Mara Lin");
        assert!(r.name_contains("mara"));
        assert!(r.name_contains(""));
        assert!(!r.name_contains("zhou"));
    }
}
