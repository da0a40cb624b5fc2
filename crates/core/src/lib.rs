pub mod config;
pub mod errors;
pub mod models;
pub mod recurrence;
pub mod services;
pub mod traits;

pub use config::AppConfig;
pub use errors::{ReminderError, ReminderResult};
pub use models::{Schedule, ScheduleStatus, Task};
pub use recurrence::next_matching_weekday;
