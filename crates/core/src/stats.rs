//! Product view and order counters.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Viewer recorded when a product page is opened without a signed-in user.
pub const ANONYMOUS_VIEWER: &str = "anonymous";

/// Views of one product, summed over the current day, month and year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCounts {
    pub daily: i64,
    pub monthly: i64,
    pub yearly: i64,
}

impl ViewCounts {
    /// Fold per-day view totals into the windows containing `today`.
    ///
    /// Days outside `today`'s year are ignored.
    #[must_use]
    pub fn summarize<I>(per_day: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, i64)>,
    {
        per_day
            .into_iter()
            .filter(|(day, _)| day.year() == today.year())
            .fold(Self::default(), |mut acc, (day, views)| {
                acc.yearly += views;
                if day.month() == today.month() {
                    acc.monthly += views;
                    if day == today {
                        acc.daily += views;
                    }
                }
                acc
            })
    }
}

/// Order counters shown on the back-office dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: i64,
    /// Orders placed today (UTC).
    pub today: i64,
    pub last_updated: Option<DateTime<Utc>>,
}
