use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Trailing-edge debouncer: each `call` supersedes the previous one,
/// and only the latest future runs once `delay` passes without another
/// call.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn call<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let prior = self
            .pending
            .lock()
            .unwrap()
            .replace(token.clone());
        if let Some(prior) = prior {
            prior.cancel();
        }

        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => fut.await,
            }
        });
    }

    /// Drop the pending call, if any, without replacing it.
    pub fn cancel(&self) {
        if let Some(token) = self.pending.lock().unwrap().take() {
            token.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
