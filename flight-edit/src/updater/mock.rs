//! Scripted [`RecordUpdater`] for tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{RecordUpdater, UpdateError};
use crate::flight::Flight;

/// What a single call to the mock does after its delay.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Succeed, returning the submitted flight.
    Echo,
    Fail(UpdateError),
}

/// Mock updater replaying a script of responses.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use flight_edit::updater::{MockResponse, MockUpdater, UpdateError};
///
/// // Always succeed
/// let updater = MockUpdater::succeeding();
///
/// // Slow failure followed by a quick success
/// let updater = MockUpdater::sequence(vec![
///     (Duration::from_millis(500), MockResponse::Fail(UpdateError::http(500, "down"))),
///     (Duration::from_millis(10), MockResponse::Echo),
/// ]);
/// ```
#[derive(Clone)]
pub struct MockUpdater {
    script: Arc<Vec<(Duration, MockResponse)>>,
    call_count: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    payloads: Arc<Mutex<Vec<Flight>>>,
}

impl MockUpdater {
    pub fn succeeding() -> Self {
        Self::sequence(vec![(Duration::ZERO, MockResponse::Echo)])
    }

    pub fn failing(error: UpdateError) -> Self {
        Self::sequence(vec![(Duration::ZERO, MockResponse::Fail(error))])
    }

    /// Responses are used in order and wrap around when exhausted.
    pub fn sequence(script: Vec<(Duration, MockResponse)>) -> Self {
        assert!(!script.is_empty(), "mock script must not be empty");
        Self {
            script: Arc::new(script),
            call_count: Arc::new(AtomicUsize::new(0)),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
            payloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Same script, every response delayed by `delay`.
    pub fn delayed(self, delay: Duration) -> Self {
        let script = self
            .script
            .iter()
            .map(|(_, response)| (delay, response.clone()))
            .collect();
        Self::sequence(script)
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were in flight at the same time.
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> Vec<Flight> {
        self.payloads.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl RecordUpdater for MockUpdater {
    async fn update_flight(&self, flight: &Flight) -> Result<Flight, UpdateError> {
        let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.payloads
            .lock()
            .expect("mock lock poisoned")
            .push(flight.clone());

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        let (delay, response) = &self.script[idx % self.script.len()];
        if !delay.is_zero() {
            tokio::time::sleep(*delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        match response {
            MockResponse::Echo => Ok(flight.clone()),
            MockResponse::Fail(error) => Err(error.clone()),
        }
    }
}
