//! Shared data models.

pub mod health;

pub use health::{
    Backend, HealthCheckRequest, HealthCheckResponse, MongoParams, MySqlParams, PostgresParams,
    RedisParams,
};
