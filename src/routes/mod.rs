pub mod collect;
pub mod health;
pub mod wait_times;
