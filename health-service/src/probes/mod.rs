//! Backend probe adapters.
//!
//! Each adapter knows how to open a client from request parameters, issue a
//! liveness round trip, and release the client. [`run_probe`] drives one
//! adapter through that lifecycle and turns the result into a
//! [`ProbeOutcome`].

pub mod mongodb;
pub mod mysql;
pub mod postgres;
pub mod redis;
pub mod sql;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use common::models::Backend;
use thiserror::Error;

pub use self::mongodb::MongoProbe;
pub use self::mysql::MySqlProbe;
pub use self::postgres::PostgresProbe;
pub use self::redis::RedisProbe;

pub type ProbeResult<T> = Result<T, ProbeError>;

/// Failure reported by a driver while probing a backend.
///
/// The `Display` output is the diagnostic text appended to the
/// `Failed to connect to ...` / `Failed to ping ...` prefixes.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Sql(#[from] sqlx::Error),

    #[error(transparent)]
    Mongo(#[from] ::mongodb::error::Error),

    #[error(transparent)]
    Redis(#[from] ::redis::RedisError),

    #[error("invalid DSN: {0}")]
    InvalidDsn(String),

    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("connection timed out after {0:?}")]
    Timeout(Duration),
}

/// Outcome of probing a single backend.
#[derive(Debug)]
pub enum ProbeOutcome {
    Alive,
    ConnectFailed(ProbeError),
    PingFailed(ProbeError),
}

impl ProbeOutcome {
    pub fn is_alive(&self) -> bool {
        matches!(self, ProbeOutcome::Alive)
    }

    /// Renders the outcome into the response string for `backend`.
    pub fn render(&self, backend: Backend) -> String {
        match self {
            ProbeOutcome::Alive => backend.alive_message(),
            ProbeOutcome::ConnectFailed(err) => {
                format!("{}{}", backend.connect_failure_prefix(), err)
            }
            ProbeOutcome::PingFailed(err) => format!("{}{}", backend.ping_failure_prefix(), err),
        }
    }
}

/// The {construct, ping, release} capability set of a backend.
#[async_trait]
pub trait ProbeAdapter: Send + Sync {
    /// Client handle owned by a single probe run.
    type Client: Send;

    fn backend(&self) -> Backend;

    /// Builds a client from the request parameters.
    ///
    /// May be lazy; the ping is the authoritative liveness signal.
    async fn connect(&self) -> ProbeResult<Self::Client>;

    /// Issues a protocol-level liveness round trip.
    async fn ping(&self, client: &mut Self::Client) -> ProbeResult<()>;

    /// Releases every resource held by the client.
    async fn release(&self, client: Self::Client) -> ProbeResult<()>;
}

/// Runs the full probe lifecycle for one adapter.
///
/// Once `connect` succeeds the client is always handed to `release` before
/// returning. If the future is dropped mid-flight, the client is dropped with
/// it and the driver closes its sockets.
pub async fn run_probe<A: ProbeAdapter>(adapter: &A) -> ProbeOutcome {
    let backend = adapter.backend();

    let mut client = match adapter.connect().await {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(backend = %backend, error = %e, "client construction failed");
            return ProbeOutcome::ConnectFailed(e);
        }
    };

    let outcome = match adapter.ping(&mut client).await {
        Ok(()) => ProbeOutcome::Alive,
        Err(e) => {
            tracing::warn!(backend = %backend, error = %e, "liveness ping failed");
            ProbeOutcome::PingFailed(e)
        }
    };

    if let Err(e) = adapter.release(client).await {
        tracing::debug!(backend = %backend, error = %e, "client release failed");
    }

    tracing::debug!(backend = %backend, alive = outcome.is_alive(), "probe finished");
    outcome
}

/// Bounds connection establishment by `limit`.
pub(crate) async fn with_connect_timeout<T, E, F>(limit: Duration, fut: F) -> ProbeResult<T>
where
    F: Future<Output = Result<T, E>>,
    ProbeError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(ProbeError::from),
        Err(_) => Err(ProbeError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Calls {
        connect: AtomicUsize,
        ping: AtomicUsize,
        release: AtomicUsize,
    }

    struct FakeProbe {
        connect_ok: bool,
        ping_ok: bool,
        release_ok: bool,
        calls: Calls,
    }

    impl FakeProbe {
        fn new(connect_ok: bool, ping_ok: bool) -> Self {
            Self {
                connect_ok,
                ping_ok,
                release_ok: true,
                calls: Calls::default(),
            }
        }
    }

    #[async_trait]
    impl ProbeAdapter for FakeProbe {
        type Client = ();

        fn backend(&self) -> Backend {
            Backend::MySQL
        }

        async fn connect(&self) -> ProbeResult<()> {
            self.calls.connect.fetch_add(1, Ordering::SeqCst);
            if self.connect_ok {
                Ok(())
            } else {
                Err(ProbeError::InvalidDsn("bad".into()))
            }
        }

        async fn ping(&self, _client: &mut ()) -> ProbeResult<()> {
            self.calls.ping.fetch_add(1, Ordering::SeqCst);
            if self.ping_ok {
                Ok(())
            } else {
                Err(ProbeError::Timeout(Duration::from_secs(1)))
            }
        }

        async fn release(&self, _client: ()) -> ProbeResult<()> {
            self.calls.release.fetch_add(1, Ordering::SeqCst);
            if self.release_ok {
                Ok(())
            } else {
                Err(ProbeError::InvalidDsn("close failed".into()))
            }
        }
    }

    #[tokio::test]
    async fn test_alive_releases_client() {
        let probe = FakeProbe::new(true, true);
        let outcome = run_probe(&probe).await;

        assert!(outcome.is_alive());
        assert_eq!(probe.calls.ping.load(Ordering::SeqCst), 1);
        assert_eq!(probe.calls.release.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ping_failure_still_releases_client() {
        let probe = FakeProbe::new(true, false);
        let outcome = run_probe(&probe).await;

        assert!(matches!(outcome, ProbeOutcome::PingFailed(_)));
        assert_eq!(probe.calls.release.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_skips_ping_and_release() {
        let probe = FakeProbe::new(false, true);
        let outcome = run_probe(&probe).await;

        assert!(matches!(outcome, ProbeOutcome::ConnectFailed(_)));
        assert_eq!(probe.calls.connect.load(Ordering::SeqCst), 1);
        assert_eq!(probe.calls.ping.load(Ordering::SeqCst), 0);
        assert_eq!(probe.calls.release.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_release_failure_is_not_reported() {
        let mut probe = FakeProbe::new(true, true);
        probe.release_ok = false;

        assert!(run_probe(&probe).await.is_alive());
        assert_eq!(probe.calls.release.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_render_uses_backend_templates() {
        let backend = Backend::PostgreSQL;
        assert_eq!(ProbeOutcome::Alive.render(backend), "PostgreSQL is alive");
        assert_eq!(
            ProbeOutcome::ConnectFailed(ProbeError::InvalidDsn("missing \"=\"".into()))
                .render(backend),
            "Failed to connect to PostgreSQL: invalid DSN: missing \"=\""
        );
        assert_eq!(
            ProbeOutcome::PingFailed(ProbeError::Timeout(Duration::from_secs(2))).render(backend),
            "Failed to ping PostgreSQL: connection timed out after 2s"
        );
    }

    #[tokio::test]
    async fn test_connect_timeout_maps_to_timeout_error() {
        let limit = Duration::from_millis(10);
        let result: ProbeResult<()> = with_connect_timeout(limit, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<(), sqlx::Error>(())
        })
        .await;

        assert!(matches!(result, Err(ProbeError::Timeout(d)) if d == limit));
    }
}
