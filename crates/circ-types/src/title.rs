use serde::{Deserialize, Serialize};

use crate::id::TitleId;

/// Shelf status of a title, derived from its available copy count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// At least one copy is on the shelf.
    OnShelf,
    /// Every copy is currently out on loan.
    CheckedOut,
}

/// Bibliographic fields plus the total copy count, as supplied when a title
/// is added to or edited in the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleDraft {
    pub name: String,
    pub author: String,
    pub isbn: String,
    pub category: String,
    pub publisher: String,
    pub total_copies: u32,
}

/// A catalog entry for a book.
///
/// A `Title` describes the work, not a single physical copy: copies are
/// counted, not individually tracked. The standing invariant is
/// `0 <= available_copies <= total_copies`; `availability` is a cached
/// mirror of `available_copies == 0` kept in sync by [`refresh_availability`].
///
/// [`refresh_availability`]: Title::refresh_availability
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub id: TitleId,
    pub name: String,
    pub author: String,
    pub isbn: String,
    pub category: String,
    pub publisher: String,
    pub total_copies: u32,
    pub available_copies: u32,
    pub availability: Availability,
}

impl Title {
    /// Create a title from a draft. All copies start on the shelf.
    pub fn new(id: TitleId, draft: TitleDraft) -> Self {
        Self {
            id,
            name: draft.name,
            author: draft.author,
            isbn: draft.isbn,
            category: draft.category,
            publisher: draft.publisher,
            total_copies: draft.total_copies,
            available_copies: draft.total_copies,
            availability: Availability::OnShelf,
        }
    }

    /// Returns `true` if at least one copy can be borrowed.
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Recompute the cached shelf status from the copy count.
    pub fn refresh_availability(&mut self) {
        self.availability = if self.available_copies == 0 {
            Availability::CheckedOut
        } else {
            Availability::OnShelf
        };
    }

    /// Apply an edit: bibliographic fields and total are replaced, and the
    /// available count is clamped to the new total.
    pub fn apply_edit(&mut self, draft: TitleDraft) {
        self.name = draft.name;
        self.author = draft.author;
        self.isbn = draft.isbn;
        self.category = draft.category;
        self.publisher = draft.publisher;
        self.total_copies = draft.total_copies;
        self.available_copies = self.available_copies.min(draft.total_copies);
        self.refresh_availability();
    }

    /// Case-insensitive substring match against the title's name.
    pub fn name_contains(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, total: u32) -> TitleDraft {
        TitleDraft {
            name: name.into(),
            author: "A. Author".into(),
            isbn: "978-0-00-000000-0".into(),
            category: "Fiction".into(),
            publisher: "Example Press".into(),
            total_copies: total,
        }
    }

    #[test]
    fn new_title_has_all_copies_on_shelf() {
        let t = Title::new(TitleId::new(), draft("Dune", 3));
        assert_eq!(t.total_copies, 3);
        assert_eq!(t.available_copies, 3);
        assert_eq!(t.availability, Availability::OnShelf);
        assert!(t.is_available());
    }

    #[test]
    fn refresh_flips_status_at_zero() {
        let mut t = Title::new(TitleId::new(), draft("Dune", 1));
        t.available_copies = 0;
        t.refresh_availability();
        assert_eq!(t.availability, Availability::CheckedOut);
        assert!(!t.is_available());

        t.available_copies = 1;
        t.refresh_availability();
        assert_eq!(t.availability, Availability::OnShelf);
    }

    #[test]
    fn edit_clamps_available_to_new_total() {
        let mut t = Title::new(TitleId::new(), draft("Dune", 5));
        t.available_copies = 4;

        let mut smaller = draft("Dune (2nd ed.)", 2);
        smaller.author = "F. Herbert".into();
        t.apply_edit(smaller);

        assert_eq!(t.name, "Dune (2nd ed.)");
        assert_eq!(t.author, "F. Herbert");
        assert_eq!(t.total_copies, 2);
        assert_eq!(t.available_copies, 2);
    }

    #[test]
    fn edit_leaves_available_alone_when_total_grows() {
        let mut t = Title::new(TitleId::new(), draft("Dune", 2));
        t.available_copies = 1;
        t.apply_edit(draft("Dune", 10));
        assert_eq!(t.available_copies, 1);
        assert_eq!(t.total_copies, 10);
    }

    #[test]
    fn name_match_ignores_case() {
        let t = Title::new(TitleId::new(), draft("The Little Prince", 1));
        assert!(t.name_contains("little PRINCE"));
        assert!(t.name_contains(""));
        assert!(!t.name_contains("dune"));
    }
}
