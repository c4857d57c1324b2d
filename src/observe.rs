//! Hook the catalog client reports its requests to.

use crate::fetch::FetchError;

/// Receives one call per request start and one per outcome.
pub trait FetchObserver: Send + Sync {
    fn request_started(&self, address: &str);
    fn request_succeeded(&self, address: &str);
    fn request_failed(&self, address: &str, err: &FetchError);
}

/// Forwards fetch events to the `log` facade.
pub struct LogObserver;

impl FetchObserver for LogObserver {
    fn request_started(&self, address: &str) {
        log::debug!("GET {}", address);
    }

    fn request_succeeded(&self, address: &str) {
        log::info!("GET {} ok", address);
    }

    fn request_failed(&self, address: &str, err: &FetchError) {
        log::warn!("GET {} failed: {}", address, err);
    }
}

pub struct NoopObserver;

impl FetchObserver for NoopObserver {
    fn request_started(&self, _address: &str) {}
    fn request_succeeded(&self, _address: &str) {}
    fn request_failed(&self, _address: &str, _err: &FetchError) {}
}
