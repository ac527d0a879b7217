//! Handler模块

use axum::{body::Bytes, extract::State, Json};

use common::errors::{AppError, AppResult};
use common::models::HealthCheckResponse;

use crate::service::HealthServiceTrait;
use crate::state::AppState;

/// 探测请求中携带的全部数据库
///
/// 解码失败返回 400；解码成功后始终返回 200，各后端的失败写入对应字段。
pub async fn health_check(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<HealthCheckResponse>> {
    let response = state.health_service.handle(&body).await?;
    Ok(Json(response))
}

/// 非 POST 请求
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
