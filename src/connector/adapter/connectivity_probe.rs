use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::application::ConnectivityProbe;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Sends a `HEAD` to the completion endpoint's origin with a 2-second
/// timeout. Any HTTP response, even 4xx/5xx, counts as online; only
/// connection failures and timeouts count as offline.
pub struct HttpConnectivityProbe {
    client: reqwest::Client,
    origin: String,
}

impl HttpConnectivityProbe {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .connect_timeout(PROBE_TIMEOUT)
                .timeout(PROBE_TIMEOUT)
                .build()
                .unwrap_or_default(),
            origin: origin_of(endpoint),
        }
    }
}

#[async_trait]
impl ConnectivityProbe for HttpConnectivityProbe {
    async fn is_online(&self) -> bool {
        match self.client.head(&self.origin).send().await {
            Err(e) if e.is_connect() || e.is_timeout() => {
                debug!("Connectivity probe to {} failed: {}", self.origin, e);
                false
            }
            _ => true,
        }
    }
}

/// `scheme://host[:port]/` of a URL; the input unchanged if it has no scheme.
fn origin_of(endpoint: &str) -> String {
    let Some((scheme, rest)) = endpoint.split_once("://") else {
        return endpoint.to_string();
    };
    let authority = rest.split('/').next().unwrap_or(rest);
    format!("{scheme}://{authority}/")
}

/// Fixed answer, switchable at runtime. Used with mock completions and in
/// tests.
pub struct StaticConnectivity {
    online: AtomicBool,
}

impl StaticConnectivity {
    pub fn online() -> Self {
        Self {
            online: AtomicBool::new(true),
        }
    }

    pub fn offline() -> Self {
        Self {
            online: AtomicBool::new(false),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectivityProbe for StaticConnectivity {
    async fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
