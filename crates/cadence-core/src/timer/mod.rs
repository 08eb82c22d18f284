mod controller;
mod period;
mod timeline;

pub use controller::Timer;
pub use period::{Period, PeriodKind, PeriodStatus};
pub use timeline::Timeline;
