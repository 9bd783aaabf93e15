pub mod ingest;
pub mod trends;
pub mod wait_times;
