pub mod schedule;
pub mod task;

pub use schedule::{Schedule, ScheduleStatus};
pub use task::Task;
