//! Defines the recurring transaction definition model.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    category::CategoryCatalog,
    database_id::{DatabaseId, UserId},
    models::{TransactionKind, iso_date, parse_date},
};

/// How often a recurring definition produces a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    /// Every 7 days.
    Weekly,
    /// Every 14 days.
    BiWeekly,
    /// Every calendar month, clamping to the end of shorter months.
    Monthly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::BiWeekly => write!(f, "bi-weekly"),
            Frequency::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "weekly" => Ok(Frequency::Weekly),
            "bi-weekly" => Ok(Frequency::BiWeekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(Error::InvalidFrequency(other.to_string())),
        }
    }
}

/// A transaction that repeats on a regular schedule (e.g., wages, rent).
///
/// Definitions do not hold the transactions they produce; the
/// materialization engine appends those to the transaction store and uses
/// `last_processed` plus the recorded occurrences to decide what is still
/// due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringDefinition {
    /// The ID of the definition.
    pub id: DatabaseId,
    /// The user the definition belongs to.
    pub user_id: UserId,
    /// The description copied onto each produced transaction.
    pub description: String,
    /// The amount copied onto each produced transaction. Always positive.
    pub amount: f64,
    /// Whether the produced transactions are income or expenses.
    pub kind: TransactionKind,
    /// The category copied onto each produced transaction.
    pub category: String,
    /// How often the definition produces a transaction.
    pub frequency: Frequency,
    /// The date of the first occurrence, inclusive.
    #[serde(with = "iso_date")]
    pub start_date: Date,
    /// When the engine last finished a pass over this definition.
    ///
    /// `None` means the definition has never been processed. The value
    /// only ever moves forward.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_processed: Option<OffsetDateTime>,
    /// Whether the sweep should visit this definition.
    ///
    /// Definitions are created active; this service never flips the flag.
    pub active: bool,
}

/// A validated recurring definition that has not been persisted yet.
///
/// Construct through [NewRecurringDefinition::new], which is the single
/// place the creation-time validation rules live: no invalid definition
/// reaches the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurringDefinition {
    /// The user the definition belongs to.
    pub user_id: UserId,
    /// The description copied onto each produced transaction.
    pub description: String,
    /// The amount copied onto each produced transaction.
    pub amount: f64,
    /// Whether the produced transactions are income or expenses.
    pub kind: TransactionKind,
    /// The category copied onto each produced transaction.
    pub category: String,
    /// How often the definition produces a transaction.
    pub frequency: Frequency,
    /// The date of the first occurrence, inclusive.
    pub start_date: Date,
}

impl NewRecurringDefinition {
    /// Validate the client's data for a new recurring definition.
    ///
    /// `frequency` and `start_date` arrive as the raw strings from the
    /// request so the error names the offending value.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::EmptyDescription] if `description` is empty or whitespace,
    /// - [Error::NonPositiveAmount] if `amount` is not greater than zero,
    /// - [Error::InvalidFrequency] if `frequency` is not a supported frequency,
    /// - [Error::InvalidDateString] if `start_date` is not a `YYYY-MM-DD` date,
    /// - [Error::UnknownCategory] if `category` does not exist for `kind`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        description: &str,
        amount: f64,
        kind: TransactionKind,
        category: &str,
        frequency: &str,
        start_date: &str,
        catalog: &CategoryCatalog,
    ) -> Result<Self, Error> {
        if description.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }

        // `!(amount > 0.0)` rather than `amount <= 0.0` so NaN is rejected too.
        if !(amount > 0.0) {
            return Err(Error::NonPositiveAmount);
        }

        let frequency = frequency.parse()?;
        let start_date = parse_date(start_date)?;

        if !catalog.contains(kind, category) {
            return Err(Error::UnknownCategory(category.to_string()));
        }

        Ok(Self {
            user_id,
            description: description.to_string(),
            amount,
            kind,
            category: category.to_string(),
            frequency,
            start_date,
        })
    }
}


#[cfg(test)]
mod new_recurring_definition_tests {
    use time::macros::date;

    use crate::{
        Error,
        category::CategoryCatalog,
        models::{Frequency, NewRecurringDefinition, TransactionKind},
    };

    fn build(
        description: &str,
        amount: f64,
        category: &str,
        frequency: &str,
        start_date: &str,
    ) -> Result<NewRecurringDefinition, Error> {
        NewRecurringDefinition::new(
            1,
            description,
            amount,
            TransactionKind::Expense,
            category,
            frequency,
            start_date,
            &CategoryCatalog::default(),
        )
    }

    #[test]
    fn valid_definition_is_accepted() {
        let definition = build("Rent", 1200.0, "Housing", "monthly", "2024-01-31")
            .expect("definition should be valid");

        assert_eq!(definition.frequency, Frequency::Monthly);
        assert_eq!(definition.start_date, date!(2024 - 01 - 31));
    }

    #[test]
    fn empty_description_is_rejected() {
        assert_eq!(
            build("  ", 1200.0, "Housing", "monthly", "2024-01-31"),
            Err(Error::EmptyDescription)
        );
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        assert_eq!(
            build("Rent", 0.0, "Housing", "monthly", "2024-01-31"),
            Err(Error::NonPositiveAmount)
        );
        assert_eq!(
            build("Rent", -1200.0, "Housing", "monthly", "2024-01-31"),
            Err(Error::NonPositiveAmount)
        );
        assert_eq!(
            build("Rent", f64::NAN, "Housing", "monthly", "2024-01-31"),
            Err(Error::NonPositiveAmount)
        );
    }

    #[test]
    fn unknown_frequency_is_rejected() {
        assert_eq!(
            build("Rent", 1200.0, "Housing", "quarterly", "2024-01-31"),
            Err(Error::InvalidFrequency("quarterly".to_string()))
        );
    }

    #[test]
    fn malformed_start_date_is_rejected() {
        assert_eq!(
            build("Rent", 1200.0, "Housing", "monthly", "31/01/2024"),
            Err(Error::InvalidDateString("31/01/2024".to_string()))
        );
    }

    #[test]
    fn category_must_match_the_kind() {
        // "Salary" exists, but only for income.
        assert_eq!(
            build("Rent", 1200.0, "Salary", "monthly", "2024-01-31"),
            Err(Error::UnknownCategory("Salary".to_string()))
        );
    }
}
