mod history_store;
mod memory;
mod pg;

pub use history_store::{dedup_threshold, should_insert, HistoryStore, UpsertOutcome};
pub use memory::MemoryHistoryStore;
pub use pg::PgHistoryStore;
