//! 数据库健康探测服务公共模块
//!
//! 包含错误类型、配置加载、中间件以及请求/响应模型。

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
