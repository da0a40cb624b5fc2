use axum::{
    extract::{Path, State},
    Json,
};

use reminder_core::services::{CreateTaskParams, UpdateTaskParams};

use crate::{
    error::ApiResult,
    response::{created, no_content, success},
    routes::AppState,
};

/// 创建任务
///
/// 校验通过后同时生成首条提醒计划。
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskParams>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let task = state.task_service.create_task(request).await?;
    Ok(created(task))
}

/// 获取任务列表
pub async fn list_tasks(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let tasks = state.task_service.list_tasks().await?;
    Ok(success(tasks))
}

/// 获取单个任务
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let task = state.task_service.get_task(id).await?;
    Ok(success(task))
}

/// 更新任务，未提供的字段保持原值
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTaskParams>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let task = state.task_service.update_task(id, request).await?;
    Ok(success(task))
}

/// 删除任务
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    state.task_service.delete_task(id).await?;
    Ok(no_content())
}

/// 获取任务的全部提醒计划
pub async fn get_task_schedules(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let schedules = state.task_service.list_schedules(id).await?;
    Ok(success(schedules))
}
