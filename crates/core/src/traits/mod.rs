pub mod notifier;
pub mod repository;

pub use notifier::Notifier;
pub use repository::{ScheduleRepository, TaskRepository};
