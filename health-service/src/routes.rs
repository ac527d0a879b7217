//! 健康探测服务路由模块

use axum::{extract::DefaultBodyLimit, routing::post, Router};

use crate::handlers::{health_check, method_not_allowed};
use crate::state::AppState;

/// 创建健康探测路由
///
/// `/health` 只接受 POST，其余方法统一返回 405。
/// 请求体不设大小上限，超大请求同样按 JSON 解码。
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", post(health_check).fallback(method_not_allowed))
        .layer(DefaultBodyLimit::disable())
}
