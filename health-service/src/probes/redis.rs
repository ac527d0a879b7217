//! Redis probe adapter.
//!
//! Construction and liveness are fused: the client is only handed out after
//! a successful `PING`, so this adapter never reports a ping failure.

use std::time::Duration;

use async_trait::async_trait;
use common::models::{Backend, RedisParams};
use redis::aio::MultiplexedConnection;
use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo, RedisError};

use super::{with_connect_timeout, ProbeAdapter, ProbeError, ProbeResult};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 6379;

pub struct RedisProbe {
    params: RedisParams,
    connect_timeout: Duration,
}

impl RedisProbe {
    pub fn new(params: &RedisParams, connect_timeout: Duration) -> Self {
        Self {
            params: params.clone(),
            connect_timeout,
        }
    }
}

#[async_trait]
impl ProbeAdapter for RedisProbe {
    type Client = MultiplexedConnection;

    fn backend(&self) -> Backend {
        Backend::Redis
    }

    async fn connect(&self) -> ProbeResult<MultiplexedConnection> {
        let client = redis::Client::open(connection_info(&self.params)?)?;

        with_connect_timeout(self.connect_timeout, async {
            let mut conn = client.get_multiplexed_async_connection().await?;
            redis::cmd("PING").query_async::<String>(&mut conn).await?;
            Ok::<_, RedisError>(conn)
        })
        .await
    }

    async fn ping(&self, _client: &mut MultiplexedConnection) -> ProbeResult<()> {
        Ok(())
    }

    async fn release(&self, client: MultiplexedConnection) -> ProbeResult<()> {
        drop(client);
        Ok(())
    }
}

/// Builds driver connection info from `host:port`, password and db index.
pub fn connection_info(params: &RedisParams) -> ProbeResult<ConnectionInfo> {
    let (host, port) = split_address(&params.address)?;
    let password = Some(params.password.clone()).filter(|p| !p.is_empty());

    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(host, port),
        redis: RedisConnectionInfo {
            db: params.db,
            password,
            ..Default::default()
        },
    })
}

fn split_address(address: &str) -> ProbeResult<(String, u16)> {
    if address.is_empty() {
        return Ok((DEFAULT_HOST.to_string(), DEFAULT_PORT));
    }

    let invalid = |reason: String| ProbeError::InvalidAddress {
        address: address.to_string(),
        reason,
    };

    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| invalid("missing port".to_string()))?;
    let port = port
        .parse::<u16>()
        .map_err(|e| invalid(format!("invalid port: {}", e)))?;

    let host = host.trim_start_matches('[').trim_end_matches(']');
    let host = if host.is_empty() { DEFAULT_HOST } else { host };

    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::{run_probe, ProbeOutcome};

    #[test]
    fn test_split_address() {
        assert_eq!(split_address("").unwrap(), ("localhost".to_string(), 6379));
        assert_eq!(split_address("cache:6380").unwrap(), ("cache".to_string(), 6380));
        assert_eq!(split_address(":6379").unwrap(), ("localhost".to_string(), 6379));
        assert_eq!(split_address("[::1]:6379").unwrap(), ("::1".to_string(), 6379));
        assert!(split_address("cache").is_err());
        assert!(split_address("cache:abc").is_err());
    }

    #[test]
    fn test_connection_info_carries_password_and_db() {
        let params = RedisParams {
            address: "127.0.0.1:6379".into(),
            password: "secret".into(),
            db: 2,
        };
        let info = connection_info(&params).unwrap();

        assert!(matches!(&info.addr, ConnectionAddr::Tcp(h, 6379) if h == "127.0.0.1"));
        assert_eq!(info.redis.db, 2);
        assert_eq!(info.redis.password.as_deref(), Some("secret"));
        assert!(info.redis.username.is_none());
    }

    #[test]
    fn test_empty_password_is_omitted() {
        let info = connection_info(&RedisParams::default()).unwrap();
        assert!(info.redis.password.is_none());
    }

    #[tokio::test]
    async fn test_refused_connection_is_connect_failure() {
        let params = RedisParams {
            address: "127.0.0.1:1".into(),
            ..Default::default()
        };
        let outcome = run_probe(&RedisProbe::new(&params, Duration::from_secs(2))).await;

        assert!(matches!(outcome, ProbeOutcome::ConnectFailed(_)));
        assert!(outcome
            .render(Backend::Redis)
            .starts_with("Failed to connect to Redis: "));
    }

    #[tokio::test]
    async fn test_malformed_address_is_connect_failure() {
        let params = RedisParams {
            address: "no-port-here".into(),
            ..Default::default()
        };
        let outcome = run_probe(&RedisProbe::new(&params, Duration::from_secs(1))).await;
        assert!(matches!(outcome, ProbeOutcome::ConnectFailed(ProbeError::InvalidAddress { .. })));
    }

    #[tokio::test]
    #[ignore = "requires a Redis server on localhost:6379"]
    async fn test_live_server_is_alive() {
        let params = RedisParams {
            address: "localhost:6379".into(),
            ..Default::default()
        };
        let outcome = run_probe(&RedisProbe::new(&params, Duration::from_secs(5))).await;
        assert_eq!(outcome.render(Backend::Redis), "Redis is alive");
    }
}
