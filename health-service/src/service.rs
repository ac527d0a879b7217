//! 健康探测编排服务模块
//!
//! 每个请求独立构造四个探测适配器，并发执行后按固定字段顺序汇总结果。

use std::time::Duration;

use async_trait::async_trait;
use common::errors::AppResult;
use common::models::{Backend, HealthCheckRequest, HealthCheckResponse};

use crate::probes::{run_probe, MongoProbe, MySqlProbe, PostgresProbe, RedisProbe};

/// 健康探测服务 Trait
#[async_trait]
pub trait HealthServiceTrait: Send + Sync {
    /// 解码请求体并探测全部后端
    async fn handle(&self, body: &[u8]) -> AppResult<HealthCheckResponse>;

    /// 使用已解码的参数探测全部后端
    async fn check(&self, req: &HealthCheckRequest) -> HealthCheckResponse;
}

/// 探测编排服务
///
/// 不缓存任何客户端：每个请求携带自己的凭据，客户端在返回前全部释放。
#[derive(Debug, Clone)]
pub struct HealthService {
    connect_timeout: Duration,
}

impl HealthService {
    /// 创建新的探测服务实例
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn handle(&self, body: &[u8]) -> AppResult<HealthCheckResponse> {
        let req = HealthCheckRequest::from_slice(body)?;
        Ok(self.check(&req).await)
    }

    async fn check(&self, req: &HealthCheckRequest) -> HealthCheckResponse {
        let postgres = PostgresProbe::new(&req.postgresql, self.connect_timeout);
        let mysql = MySqlProbe::new(&req.mysql, self.connect_timeout);
        let mongodb = MongoProbe::new(&req.mongodb);
        let redis = RedisProbe::new(&req.redis, self.connect_timeout);

        // 各探测互不依赖，全部完成（含释放）后才汇总
        let (postgresql, mysql, mongodb, redis) = tokio::join!(
            run_probe(&postgres),
            run_probe(&mysql),
            run_probe(&mongodb),
            run_probe(&redis),
        );

        let response = HealthCheckResponse {
            postgresql: postgresql.render(Backend::PostgreSQL),
            mysql: mysql.render(Backend::MySQL),
            mongodb: mongodb.render(Backend::MongoDB),
            redis: redis.render(Backend::Redis),
        };

        let alive = [&postgresql, &mysql, &mongodb, &redis]
            .iter()
            .filter(|outcome| outcome.is_alive())
            .count();
        tracing::info!(alive, total = Backend::ALL.len(), "健康探测完成");

        response
    }
}
