use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One stored sample of a ride's live status. Rows are append-only: a ride
/// accumulates many of these over time, at most one per dedup window.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: i64,
    /// Opaque upstream entity id (informational, not part of the dedup key).
    pub ride_id: String,
    pub external_id: String,
    pub park_id: String,
    pub entity_type: String,
    pub name: String,
    pub status: String,
    /// Business time, reported by the upstream source.
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// JSON array text, `"[]"` when the source reported nothing.
    pub operating_hours: String,
    pub standby_wait_time: Option<i32>,
    pub return_time_state: Option<String>,
    pub return_start: Option<DateTime<Utc>>,
    pub return_end: Option<DateTime<Utc>>,
    /// JSON array text, `"[]"` when the source reported nothing.
    pub forecast: String,
}

impl HistoryRecord {
    pub fn identity(&self) -> RideIdentity {
        RideIdentity {
            external_id: self.external_id.clone(),
            park_id: self.park_id.clone(),
        }
    }
}

/// A row about to be inserted; the store assigns the id and restamps
/// `updated_at` at write time.
#[derive(Debug, Clone)]
pub struct NewHistoryRecord {
    pub ride_id: String,
    pub external_id: String,
    pub park_id: String,
    pub entity_type: String,
    pub name: String,
    pub status: String,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub operating_hours: String,
    pub standby_wait_time: Option<i32>,
    pub return_time_state: Option<String>,
    pub return_start: Option<DateTime<Utc>>,
    pub return_end: Option<DateTime<Utc>>,
    pub forecast: String,
}

impl NewHistoryRecord {
    pub fn identity(&self) -> RideIdentity {
        RideIdentity {
            external_id: self.external_id.clone(),
            park_id: self.park_id.clone(),
        }
    }
}

/// The (external id, park id) pair that identifies one ride across its
/// history rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RideIdentity {
    pub external_id: String,
    pub park_id: String,
}

impl std::fmt::Display for RideIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.park_id, self.external_id)
    }
}

/// Signed wait-time change between two time-adjacent samples of one ride.
/// Derived on read, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub trend: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}
