mod live_data;
mod queue_times;
mod themeparks;

pub use live_data::{LiveDataProvider, ProviderError};
pub use queue_times::QueueTimesProvider;
pub use themeparks::ThemeParksProvider;
