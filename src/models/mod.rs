//! The domain models for transactions and recurring definitions.

mod recurring;
mod transaction;

pub use recurring::{Frequency, NewRecurringDefinition, RecurringDefinition};
pub use transaction::{NewTransaction, Transaction, TransactionKind};

use time::Date;

use crate::Error;

/// Serde support for calendar dates as zero-padded `YYYY-MM-DD` strings.
///
/// All dates cross the API boundary in this form, with no time-of-day or
/// timezone suffix, so they compare lexicographically in chronological
/// order and never drift across timezones.
pub(crate) mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::Error as _};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    /// The one date format used in the database and on the wire.
    pub(crate) const FORMAT: &[BorrowedFormatItem<'static>] =
        format_description!("[year]-[month]-[day]");

    pub(crate) fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = date.format(FORMAT).map_err(S::Error::custom)?;

        serializer.serialize_str(&text)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;

        Date::parse(&text, FORMAT).map_err(D::Error::custom)
    }
}

/// Parse a zero-padded `YYYY-MM-DD` date string.
///
/// # Errors
/// Returns an [Error::InvalidDateString] if `text` is in any other form,
/// including non-zero-padded dates and dates with a time component.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text, iso_date::FORMAT).map_err(|_| Error::InvalidDateString(text.to_string()))
}
