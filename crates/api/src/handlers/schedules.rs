use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;

use crate::{
    error::ApiResult,
    response::{no_content, success},
    routes::AppState,
};

/// 获取单条提醒计划
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let schedule = state.notify_service.get_schedule(id).await?;
    Ok(success(schedule))
}

/// 取消尚未投递的提醒计划
pub async fn cancel_schedule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    state.notify_service.cancel(id).await?;
    Ok(no_content())
}

/// 对当前所有到期的提醒计划执行一轮投递
pub async fn dispatch_due(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let attempted = state.notify_service.run_due(Utc::now()).await?;
    Ok(success(json!({ "attempted": attempted })))
}
