//! The category catalog consulted when recurring definitions are created.
//!
//! Category taxonomy management lives outside this service; the engine
//! only needs to ask whether a category exists for a transaction kind.
//! The default catalog carries the application's stock categories.

use crate::models::TransactionKind;

/// The categories allowed for each transaction kind.
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    income: Vec<String>,
    expense: Vec<String>,
}

impl CategoryCatalog {
    /// Create a catalog from explicit per-kind category lists.
    pub fn new(income: Vec<String>, expense: Vec<String>) -> Self {
        Self { income, expense }
    }

    /// Whether `category` exists for transactions of `kind`.
    pub fn contains(&self, kind: TransactionKind, category: &str) -> bool {
        let categories = match kind {
            TransactionKind::Income => &self.income,
            TransactionKind::Expense => &self.expense,
        };

        categories.iter().any(|name| name == category)
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::new(
            [
                "Salary",
                "Freelance",
                "Business",
                "Investments",
                "Rental Income",
                "Gifts Received",
                "Other Income",
            ]
            .map(String::from)
            .to_vec(),
            [
                "Food & Dining",
                "Transportation",
                "Housing",
                "Utilities",
                "Healthcare",
                "Entertainment",
                "Shopping",
                "Education",
                "Personal Care",
                "Insurance",
                "Debt Payments",
                "Savings",
                "Investments",
                "Gifts & Donations",
                "Travel",
                "Miscellaneous",
            ]
            .map(String::from)
            .to_vec(),
        )
    }
}
