use serde::{Deserialize, Serialize};

/// Circulation policy configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CirculationConfig {
    /// Maximum number of loans a reader may have out at once.
    pub max_active_loans: u32,
    /// Loan period: the due date is the borrow date plus this many days.
    pub loan_period_days: u32,
}

impl Default for CirculationConfig {
    fn default() -> Self {
        Self {
            max_active_loans: 5,
            loan_period_days: 30,
        }
    }
}
