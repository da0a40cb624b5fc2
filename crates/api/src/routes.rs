use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use reminder_core::services::{NotifyService, TaskService};

use crate::handlers::{
    health::health_check,
    schedules::{cancel_schedule, dispatch_due, get_schedule},
    tasks::{create_task, delete_task, get_task, get_task_schedules, list_tasks, update_task},
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub task_service: Arc<TaskService>,
    pub notify_service: Arc<NotifyService>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 任务管理API
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", get(get_task))
        .route("/api/tasks/{id}/update", post(update_task))
        .route("/api/tasks/{id}/delete", post(delete_task))
        .route("/api/tasks/{id}/schedules", get(get_task_schedules))
        // 提醒计划API
        .route("/api/schedules/{id}", get(get_schedule))
        .route("/api/schedules/{id}/cancel", post(cancel_schedule))
        .route("/api/schedules/dispatch", post(dispatch_due))
        .with_state(state)
}
