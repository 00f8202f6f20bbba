//! Defines the transaction model.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{DatabaseId, UserId},
    models::iso_date,
};

/// Whether a transaction brought money in or paid money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money earned, e.g. wages or interest.
    Income,
    /// Money spent, e.g. rent or groceries.
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "Income"),
            TransactionKind::Expense => write!(f, "Expense"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "Income" => Ok(TransactionKind::Income),
            "Expense" => Ok(TransactionKind::Expense),
            other => Err(Error::InvalidTransactionKind(other.to_string())),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// The user the transaction belongs to.
    pub user_id: UserId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
    /// The category the transaction belongs to.
    pub category: String,
    /// The calendar date the transaction happened on.
    ///
    /// For transactions produced by the recurring engine this is exactly
    /// one computed occurrence date, never a date derived from the local
    /// time of the machine that ran the sweep.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// The recurring definition this transaction was materialized from.
    ///
    /// `None` for transactions entered by hand. Together with `date` this
    /// uniquely identifies a materialized occurrence.
    pub recurring_id: Option<DatabaseId>,
}

/// The data for a transaction that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The user the transaction belongs to.
    pub user_id: UserId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
    /// The category the transaction belongs to.
    pub category: String,
    /// The calendar date the transaction happened on.
    pub date: Date,
    /// The recurring definition the transaction was materialized from, if any.
    pub recurring_id: Option<DatabaseId>,
}
