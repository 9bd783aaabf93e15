use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::models::{HistoryRecord, NewHistoryRecord};

/// Minimum gap between consecutive stored samples for one ride identity.
pub fn dedup_threshold() -> Duration {
    Duration::minutes(5)
}

/// The dedup rule, shared by every store implementation: insert on first
/// sighting, otherwise only when the incoming business time is at least the
/// threshold past the latest stored one. Both sides compare in UTC; the
/// boundary is inclusive.
pub fn should_insert(existing: Option<DateTime<Utc>>, incoming: DateTime<Utc>) -> bool {
    match existing {
        None => true,
        Some(latest) => incoming.signed_duration_since(latest) >= dedup_threshold(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub inserted: usize,
    pub skipped: usize,
}

/// Storage seam for ride history. Backed by Postgres in production and by an
/// in-memory implementation in tests.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Writes a batch under the dedup rule, all-or-nothing. Records are
    /// applied in input order, each checked against the then-current latest
    /// row for its identity, so the second of two close-together entries for
    /// the same ride in one batch gets skipped.
    async fn upsert_batch(&self, records: &[NewHistoryRecord])
        -> Result<UpsertOutcome, sqlx::Error>;

    /// One row per ride identity, the one with the maximum `last_updated`
    /// (ties broken by highest id), ordered by park then name.
    async fn latest_per_ride(&self) -> Result<Vec<HistoryRecord>, sqlx::Error>;

    /// Rows with `last_updated >= cutoff`, newest first, then park/name.
    async fn since(&self, cutoff: DateTime<Utc>) -> Result<Vec<HistoryRecord>, sqlx::Error>;

    /// Rows for one park, ordered by name.
    async fn by_park(&self, park_id: &str) -> Result<Vec<HistoryRecord>, sqlx::Error>;

    /// Rows for one entity type, ordered by park then name.
    async fn by_type(&self, entity_type: &str) -> Result<Vec<HistoryRecord>, sqlx::Error>;

    /// Every row, ordered by park, entity type, name.
    async fn all(&self) -> Result<Vec<HistoryRecord>, sqlx::Error>;

    /// Age-based sweep keyed on `updated_at`. Returns rows deleted.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error>;

    /// Connection liveness, backing `/health`.
    async fn ping(&self) -> Result<(), sqlx::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(min: i64, sec: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
            + Duration::minutes(min)
            + Duration::seconds(sec)
    }

    #[test]
    fn first_sighting_always_inserts() {
        assert!(should_insert(None, t(0, 0)));
    }

    #[test]
    fn five_minute_boundary_is_inclusive() {
        assert!(should_insert(Some(t(0, 0)), t(5, 0)));
    }

    #[test]
    fn just_under_threshold_skips() {
        assert!(!should_insert(Some(t(0, 0)), t(4, 59)));
    }

    #[test]
    fn older_than_latest_skips() {
        assert!(!should_insert(Some(t(10, 0)), t(0, 0)));
    }
}
