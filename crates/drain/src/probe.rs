//! Connectivity probes

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

/// Answers "is the network reachable right now?"
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// True when records can be forwarded
    async fn is_online(&self) -> bool;
}

#[async_trait]
impl<T: ConnectivityProbe + ?Sized> ConnectivityProbe for Arc<T> {
    async fn is_online(&self) -> bool {
        (**self).is_online().await
    }
}

/// Probe that always reports online
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

#[async_trait]
impl ConnectivityProbe for AlwaysOnline {
    async fn is_online(&self) -> bool {
        true
    }
}

/// Probe driven by the host, e.g. from platform reachability callbacks
#[derive(Debug, Default)]
pub struct ManualProbe {
    online: AtomicBool,
}

impl ManualProbe {
    /// Probe starting in the given state
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    /// Update the reported state
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectivityProbe for ManualProbe {
    async fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Probe that opens one TCP connection to a known endpoint.
///
/// Online means the connect finished within the timeout. No retries.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    address: String,
    timeout: Duration,
}

impl TcpProbe {
    /// Default connect timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

    /// Probe `address` (`host:port`) with the given timeout
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }

    /// Endpoint being probed
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Connect timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn is_online(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(self.address.as_str())).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("Connectivity probe to {} failed: {}", self.address, e);
                false
            }
            Err(_) => {
                debug!(
                    "Connectivity probe to {} timed out after {:?}",
                    self.address, self.timeout
                );
                false
            }
        }
    }
}
