mod history;
mod ride;

pub use history::{HistoryRecord, NewHistoryRecord, RideIdentity, TrendPoint};
pub use ride::{
    EntityType, ForecastEntry, LiveRideEntry, OperatingHours, ParkLiveData, QueueInfo,
    QueueTimesLand, QueueTimesResponse, QueueTimesRide, ReturnTimeInfo, RideStatus, StandbyQueue,
};
