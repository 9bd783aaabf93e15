use chrono::FixedOffset;
use std::time::Duration;

// Disneyland and Disney California Adventure.
const DEFAULT_PARK_IDS: [&str; 2] = [
    "7340550b-c14d-4def-80bb-acdb51d49a66",
    "832fcd51-ea19-4e77-85c7-75d5843b127c",
];

/// Bounded retry for collection cycles: `max_attempts` total attempts with a
/// fixed `delay` between them.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(30),
        }
    }
}

/// All knobs for the periodic collector. Built once in `main` and passed
/// down; nothing here lives in global state.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub park_ids: Vec<String>,
    /// Time between collection cycles.
    pub interval: Duration,
    pub retry: RetryPolicy,
    /// Park-local offset from UTC, used by the trend hour-of-day filter.
    pub park_utc_offset: FixedOffset,
    /// Rows whose `updated_at` is older than this get swept after each
    /// cycle. `None` disables the sweep.
    pub max_record_age: Option<Duration>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            park_ids: DEFAULT_PARK_IDS.iter().map(|s| s.to_string()).collect(),
            interval: Duration::from_secs(120),
            retry: RetryPolicy::default(),
            // Pacific time, the configured parks' zone.
            park_utc_offset: FixedOffset::west_opt(7 * 3600).expect("valid offset"),
            max_record_age: Some(Duration::from_secs(24 * 3600)),
        }
    }
}

impl CollectorConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(ids) = std::env::var("PARK_IDS") {
            let ids: Vec<String> = ids
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !ids.is_empty() {
                config.park_ids = ids;
            }
        }

        if let Some(secs) = env_u64("COLLECT_INTERVAL_SECS") {
            config.interval = Duration::from_secs(secs);
        }
        if let Some(attempts) = env_u32("COLLECT_MAX_ATTEMPTS") {
            // Zero would turn the retry loop into a silent no-op.
            config.retry.max_attempts = attempts.max(1);
        }
        if let Some(secs) = env_u64("COLLECT_RETRY_DELAY_SECS") {
            config.retry.delay = Duration::from_secs(secs);
        }
        if let Some(hours) = env_u64("CLEANUP_MAX_AGE_HOURS") {
            config.max_record_age = if hours == 0 {
                None
            } else {
                Some(Duration::from_secs(hours * 3600))
            };
        }
        if let Ok(offset) = std::env::var("PARK_UTC_OFFSET_HOURS") {
            if let Ok(hours) = offset.parse::<i32>() {
                if let Some(parsed) = FixedOffset::east_opt(hours * 3600) {
                    config.park_utc_offset = parsed;
                }
            }
        }

        config
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
