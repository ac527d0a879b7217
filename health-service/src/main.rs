//! 数据库健康探测服务
//!
//! 按请求探测调用方提供的数据库是否可用：
//! - PostgreSQL / MySQL：建立连接并发送协议级 ping
//! - MongoDB：执行 `ping` 命令
//! - Redis：建连时发送 `PING`
//!
//! 每个请求独立建连，所有客户端在响应返回前释放。

mod handlers;
mod probes;
mod routes;
mod service;
mod state;

use axum::{middleware, Router};
use common::config::AppConfig;
use common::errors::AppError;
use common::middleware::request_id::request_id_middleware;
use state::AppState;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE_NAME: &str = "health-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（包含 .env），日志级别也可能来自其中
    let config = AppConfig::load_with_service(SERVICE_NAME);

    // 初始化日志追踪
    init_tracing(config.log_json);

    // 创建路由
    let app = create_router(AppState::new(config.clone()));

    // 启动服务
    let addr = config.bind_addr();
    info!(service = SERVICE_NAME, address = %addr, "Server starting on port {}...", config.port);

    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(source) => {
            let err = AppError::Bind { addr, source };
            error!(error = %err, "绑定地址失败");
            return Err(err.into());
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(service = SERVICE_NAME, "服务已停止");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "无法监听 Ctrl-C 信号");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "无法监听 SIGTERM 信号");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("收到关闭信号，正在停止服务");
}
