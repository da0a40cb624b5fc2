use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use reminder_core::ReminderError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("调度器错误: {0}")]
    Reminder(#[from] ReminderError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // 校验类错误映射到客户端错误，持久化错误映射到服务端错误
        let (status, error_code, message) = match &self {
            ApiError::Reminder(ReminderError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone())
            }
            ApiError::Reminder(ReminderError::TaskNotFound { id }) => (
                StatusCode::NOT_FOUND,
                "TASK_NOT_FOUND",
                format!("任务 ID {id} 不存在"),
            ),
            ApiError::Reminder(ReminderError::ScheduleNotFound { id }) => (
                StatusCode::NOT_FOUND,
                "SCHEDULE_NOT_FOUND",
                format!("提醒计划 ID {id} 不存在"),
            ),
            ApiError::Reminder(ReminderError::InvalidState { from, to }) => (
                StatusCode::CONFLICT,
                "INVALID_STATE",
                format!("非法的状态流转: {from} -> {to}"),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Reminder(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                e.to_string(),
            ),
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message,
            },
            "timestamp": chrono::Utc::now(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reminder_core::models::ScheduleStatus;

    #[test]
    fn test_error_status_mapping() {
        let response =
            ApiError::Reminder(ReminderError::invalid_input("开始时间不能为空")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::Reminder(ReminderError::task_not_found(1)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::Reminder(ReminderError::schedule_not_found(1)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::Reminder(ReminderError::InvalidState {
            from: ScheduleStatus::Succeeded,
            to: ScheduleStatus::Sending,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response =
            ApiError::Reminder(ReminderError::database_error("磁盘已满")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
