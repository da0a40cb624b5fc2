pub mod notify_service;
pub mod task_service;

pub use notify_service::NotifyService;
pub use task_service::{CreateTaskParams, TaskService, UpdateTaskParams};
