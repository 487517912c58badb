//! Descriptive statistics over catalog and loan snapshots.
//!
//! Everything here is a pure function of its inputs: reporting consumes
//! read-only slices and never touches the store.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use circ_types::{Loan, Title};

/// Headline counters for the dashboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardStats {
    /// Total copies held across the catalog.
    pub copies_held: u32,
    /// Loans opened today.
    pub today_borrows: usize,
    /// Loans currently out.
    pub active_loans: usize,
    /// Active loans past their due date.
    pub overdue_loans: usize,
}

impl DashboardStats {
    pub fn compute(titles: &[Title], loans: &[Loan], today: NaiveDate) -> Self {
        let copies_held = titles.iter().map(|t| t.total_copies).sum();
        let today_borrows = loans.iter().filter(|l| l.borrowed_on == today).count();
        let active: Vec<&Loan> = loans.iter().filter(|l| l.status.is_active()).collect();
        let overdue_loans = active.iter().filter(|l| l.overdue_on(today)).count();
        Self {
            copies_held,
            today_borrows,
            active_loans: active.len(),
            overdue_loans,
        }
    }
}

/// One category's borrow activity for a month.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryTrend {
    pub category: String,
    /// Loans opened in the month for titles of this category.
    pub borrows: usize,
    /// Copies held across the category.
    pub copies_held: u32,
    /// Borrow frequency: month borrows divided by copies held.
    pub frequency: f64,
}

/// Restocking suggestion derived from a category's borrow frequency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseSuggestion {
    pub category: String,
    pub recommended: u32,
    pub copies_held: u32,
    pub borrows: usize,
}

/// Month-level circulation report: category rankings, restocking
/// suggestions, and the trend against the previous month.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    /// Loans opened in the month.
    pub borrow_count: usize,
    /// Per-category activity, most-borrowed-per-copy first.
    pub rankings: Vec<CategoryTrend>,
    /// Up to three most popular categories.
    pub top_categories: Vec<String>,
    pub purchase_suggestions: Vec<PurchaseSuggestion>,
    /// Percentage change in borrows versus the previous calendar month;
    /// 100 when the previous month had none.
    pub change_from_previous: f64,
}

impl MonthlyReport {
    pub fn compute(titles: &[Title], loans: &[Loan], year: i32, month: u32) -> Self {
        let month_borrows: Vec<&Loan> = loans
            .iter()
            .filter(|l| in_month(l.borrowed_on, year, month))
            .collect();

        // Copies held per category, seeded from the catalog so categories
        // with no borrows this month still rank (at frequency zero).
        let mut copies_by_category: BTreeMap<&str, u32> = BTreeMap::new();
        for title in titles {
            *copies_by_category.entry(title.category.as_str()).or_default() +=
                title.total_copies;
        }

        let mut borrows_by_category: BTreeMap<&str, usize> = BTreeMap::new();
        for loan in &month_borrows {
            if let Some(title) = titles.iter().find(|t| t.id == loan.title_id) {
                *borrows_by_category.entry(title.category.as_str()).or_default() += 1;
            }
        }

        let mut rankings: Vec<CategoryTrend> = copies_by_category
            .iter()
            .filter(|(_, copies)| **copies > 0)
            .map(|(category, copies)| {
                let borrows = borrows_by_category.get(category).copied().unwrap_or(0);
                CategoryTrend {
                    category: (*category).to_string(),
                    borrows,
                    copies_held: *copies,
                    frequency: borrows as f64 / f64::from(*copies),
                }
            })
            .collect();
        rankings.sort_by(|a, b| b.frequency.total_cmp(&a.frequency));

        let top_categories = rankings
            .iter()
            .filter(|t| t.borrows > 0)
            .take(3)
            .map(|t| t.category.clone())
            .collect();

        // Suggested restock: round(borrows * 1.5 - copies held), where positive.
        let purchase_suggestions = rankings
            .iter()
            .filter_map(|t| {
                let recommended =
                    (t.borrows as f64 * 1.5 - f64::from(t.copies_held)).round() as i64;
                (recommended > 0).then(|| PurchaseSuggestion {
                    category: t.category.clone(),
                    recommended: recommended as u32,
                    copies_held: t.copies_held,
                    borrows: t.borrows,
                })
            })
            .collect();

        let (prev_year, prev_month) = previous_month(year, month);
        let previous_borrows = loans
            .iter()
            .filter(|l| in_month(l.borrowed_on, prev_year, prev_month))
            .count();
        let change_from_previous = if previous_borrows > 0 {
            (month_borrows.len() as f64 - previous_borrows as f64) / previous_borrows as f64
                * 100.0
        } else {
            100.0
        };

        Self {
            year,
            month,
            borrow_count: month_borrows.len(),
            rankings,
            top_categories,
            purchase_suggestions,
            change_from_previous,
        }
    }
}

fn in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}
