//! Fire-and-forget usage beacons

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use super::BeaconTransport;
use crate::GridClient;
use crate::error::Error;

#[async_trait]
impl BeaconTransport for GridClient {
    async fn send_beacon(&self, path: &str, event: &Value) -> Result<(), Error> {
        self.send_json(Method::POST, path, Some(event)).await?;
        Ok(())
    }
}

/// Posts usage events and never reports failures.
///
/// The first failed send is logged and disables the beacon for the rest of
/// the session; later events are dropped silently.
#[derive(Clone)]
pub struct Beacon {
    inner: Arc<BeaconInner>,
}

struct BeaconInner {
    transport: Arc<dyn BeaconTransport>,
    path: String,
    disabled: AtomicBool,
}

impl Beacon {
    pub fn new(transport: Arc<dyn BeaconTransport>, path: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(BeaconInner {
                transport,
                path: path.into(),
                disabled: AtomicBool::new(false),
            }),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.disabled.load(Ordering::Acquire)
    }

    /// Sends one event and waits for it.
    pub async fn send(&self, event: Value) {
        if self.is_disabled() {
            return;
        }
        if let Err(e) = self.inner.transport.send_beacon(&self.inner.path, &event).await {
            if !self.inner.disabled.swap(true, Ordering::AcqRel) {
                log::warn!("beacon to {} failed, disabling: {e}", self.inner.path);
            }
        }
    }

    /// Sends one event in the background.
    pub fn fire(&self, event: Value) {
        if self.is_disabled() {
            return;
        }
        let beacon = self.clone();
        tokio::spawn(async move { beacon.send(event).await });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    struct FailingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BeaconTransport for FailingTransport {
        async fn send_beacon(&self, _path: &str, _event: &Value) -> Result<(), Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::http(503, "unavailable").into())
        }
    }

    #[tokio::test]
    async fn test_disables_after_first_failure() {
        let transport = Arc::new(FailingTransport {
            calls: AtomicUsize::new(0),
        });
        let beacon = Beacon::new(transport.clone(), "/api/beacon/");

        beacon.send(json!({"event": "view"})).await;
        beacon.send(json!({"event": "view"})).await;
        beacon.fire(json!({"event": "view"}));

        assert!(beacon.is_disabled());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }
}
