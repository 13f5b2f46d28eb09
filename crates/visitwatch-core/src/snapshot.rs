//! Country filter: report rows in, watch-list snapshot out.

use std::collections::BTreeMap;

/// One `(country, active users)` pair from a real-time report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub country: String,
    pub active_users: i64,
}

impl ReportRow {
    pub fn new(country: impl Into<String>, active_users: i64) -> Self {
        Self {
            country: country.into(),
            active_users,
        }
    }
}

/// Active-user counts for monitored countries, keyed by country name.
///
/// Every key is a member of the watch-list the snapshot was built with.
/// Zero counts are kept; callers decide what to do with them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorSnapshot {
    counts: BTreeMap<String, i64>,
}

impl VisitorSnapshot {
    #[must_use]
    pub fn get(&self, country: &str) -> Option<i64> {
        self.counts.get(country).copied()
    }

    /// All entries in country-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Entries with a strictly positive count.
    pub fn active(&self) -> impl Iterator<Item = (&str, i64)> {
        self.iter().filter(|(_, count)| *count > 0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Collapse report rows into a snapshot restricted to `monitored`.
///
/// Merge policy is last-write-wins: when a country appears in several rows,
/// the count from the last row replaces earlier ones. Counts are never summed.
pub fn filter_monitored<S>(rows: &[ReportRow], monitored: &[S]) -> VisitorSnapshot
where
    S: AsRef<str>,
{
    let mut counts = BTreeMap::new();
    for row in rows {
        if monitored.iter().any(|m| m.as_ref() == row.country) {
            counts.insert(row.country.clone(), row.active_users);
        }
    }
    VisitorSnapshot { counts }
}
