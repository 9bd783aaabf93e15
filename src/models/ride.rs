use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::NewHistoryRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Attraction,
    Show,
    Restaurant,
    #[serde(other)]
    Unknown,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Attraction => "ATTRACTION",
            EntityType::Show => "SHOW",
            EntityType::Restaurant => "RESTAURANT",
            EntityType::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Operating,
    Closed,
    Down,
    Refurbishment,
    #[serde(other)]
    Unknown,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Operating => "OPERATING",
            RideStatus::Closed => "CLOSED",
            RideStatus::Down => "DOWN",
            RideStatus::Refurbishment => "REFURBISHMENT",
            RideStatus::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingHours {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandbyQueue {
    #[serde(rename = "waitTime")]
    pub wait_time: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnTimeInfo {
    pub state: String,
    pub return_start: DateTime<Utc>,
    #[serde(default)]
    pub return_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueInfo {
    #[serde(rename = "STANDBY", default)]
    pub standby: Option<StandbyQueue>,
    #[serde(rename = "RETURN_TIME", default)]
    pub return_time: Option<ReturnTimeInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    pub percentage: f64,
    pub wait_time: i32,
    pub time: DateTime<Utc>,
}

/// One ride's entry in the themeparks.wiki `liveData` array. Ephemeral:
/// built per fetch and converted into a `NewHistoryRecord` for storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveRideEntry {
    pub id: String,
    #[serde(default)]
    pub park_id: String,
    #[serde(default)]
    pub external_id: String,
    pub entity_type: EntityType,
    pub name: String,
    pub status: RideStatus,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub operating_hours: Vec<OperatingHours>,
    #[serde(default)]
    pub queue: Option<QueueInfo>,
    #[serde(default)]
    pub forecast: Vec<ForecastEntry>,
}

impl LiveRideEntry {
    /// Converts into a storable row. Optional sections serialize to `"[]"`
    /// rather than null so the columns always hold a JSON array.
    pub fn to_new_record(&self) -> Result<NewHistoryRecord, serde_json::Error> {
        let now = Utc::now();

        let operating_hours = if self.operating_hours.is_empty() {
            "[]".to_string()
        } else {
            serde_json::to_string(&self.operating_hours)?
        };
        let forecast = if self.forecast.is_empty() {
            "[]".to_string()
        } else {
            serde_json::to_string(&self.forecast)?
        };

        let mut record = NewHistoryRecord {
            ride_id: self.id.clone(),
            external_id: self.external_id.clone(),
            park_id: self.park_id.clone(),
            entity_type: self.entity_type.as_str().to_string(),
            name: self.name.clone(),
            status: self.status.as_str().to_string(),
            last_updated: self.last_updated,
            created_at: now,
            updated_at: now,
            operating_hours,
            standby_wait_time: None,
            return_time_state: None,
            return_start: None,
            return_end: None,
            forecast,
        };

        // Some feeds omit externalId; the upstream id still identifies the ride.
        if record.external_id.is_empty() {
            record.external_id = self.id.clone();
        }

        if let Some(queue) = &self.queue {
            if let Some(standby) = &queue.standby {
                record.standby_wait_time = standby.wait_time;
            }
            if let Some(rt) = &queue.return_time {
                record.return_time_state = Some(rt.state.clone());
                record.return_start = Some(rt.return_start);
                record.return_end = rt.return_end;
            }
        }

        Ok(record)
    }
}

/// Full live response for one park from themeparks.wiki.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkLiveData {
    pub id: String,
    #[serde(default)]
    pub entity_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub live_data: Vec<LiveRideEntry>,
}

// Legacy queue-times.com shapes.

#[derive(Debug, Clone, Deserialize)]
pub struct QueueTimesResponse {
    #[serde(default)]
    pub lands: Vec<QueueTimesLand>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueTimesLand {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub rides: Vec<QueueTimesRide>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueTimesRide {
    pub id: i64,
    pub name: String,
    pub is_open: bool,
    #[serde(default)]
    pub wait_time: Option<i32>,
    #[serde(default)]
    pub last_updated: String,
}

impl QueueTimesRide {
    /// Maps a legacy entry onto the live-data shape. The legacy feed has no
    /// park or entity metadata, so the caller supplies the park id and
    /// everything is treated as an attraction.
    pub fn to_live_entry(&self, park_id: &str) -> LiveRideEntry {
        let last_updated = DateTime::parse_from_rfc3339(&self.last_updated)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let status = if self.is_open {
            RideStatus::Operating
        } else {
            RideStatus::Closed
        };

        LiveRideEntry {
            id: self.id.to_string(),
            park_id: park_id.to_string(),
            external_id: self.id.to_string(),
            entity_type: EntityType::Attraction,
            name: self.name.clone(),
            status,
            last_updated,
            operating_hours: Vec::new(),
            queue: Some(QueueInfo {
                standby: Some(StandbyQueue {
                    wait_time: self.wait_time,
                }),
                return_time: None,
            }),
            forecast: Vec::new(),
        }
    }
}
