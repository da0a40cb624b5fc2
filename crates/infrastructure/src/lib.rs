pub mod database;
pub mod notifier;

pub use database::sqlite::{SqliteScheduleRepository, SqliteTaskRepository};
pub use notifier::{build_notifier, LogNotifier, WebhookNotifier};
