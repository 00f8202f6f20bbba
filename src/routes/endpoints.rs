//! The API endpoint URIs.

/// The route to list and create recurring transaction definitions.
pub const RECURRING: &str = "/api/recurring";

/// The route for triggering a materialization sweep by hand.
///
/// The scheduler drives the daily sweep; this endpoint exists for
/// administration and testing.
pub const RECURRING_SWEEP: &str = "/api/recurring/sweep";
