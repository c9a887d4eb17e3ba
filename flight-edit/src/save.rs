use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::flight::Flight;
use crate::updater::{RecordUpdater, UpdateError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Success,
    Error,
}

impl SaveStatus {
    /// User-visible status line.
    pub fn message(self) -> &'static str {
        match self {
            SaveStatus::Idle => "",
            SaveStatus::Success => "Success!",
            SaveStatus::Error => "Error!",
        }
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// What happens to an in-flight save when another one is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Both run. Only the newest is tracked for teardown; the older one may
    /// still update the status when it completes.
    #[default]
    Race,
    /// The previously tracked save is aborted.
    Supersede,
    /// Saves reach the updater one at a time, in call order.
    Serialize,
}

/// Submits flights to a [`RecordUpdater`] in the background and turns the
/// outcome into a [`SaveStatus`].
pub struct SaveCoordinator {
    updater: Arc<dyn RecordUpdater>,
    policy: OverlapPolicy,
    status: Arc<watch::Sender<SaveStatus>>,
    last_error: Arc<Mutex<Option<UpdateError>>>,
    serial: Arc<AsyncMutex<()>>,
    tracked: Option<JoinHandle<()>>,
}

impl SaveCoordinator {
    pub fn new(updater: Arc<dyn RecordUpdater>, policy: OverlapPolicy) -> Self {
        let (status, _) = watch::channel(SaveStatus::Idle);
        Self {
            updater,
            policy,
            status: Arc::new(status),
            last_error: Arc::new(Mutex::new(None)),
            serial: Arc::new(AsyncMutex::new(())),
            tracked: None,
        }
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Starts saving `flight` and returns immediately. Must be called from
    /// within a tokio runtime.
    pub fn save(&mut self, flight: Flight) {
        if self.policy == OverlapPolicy::Supersede {
            if let Some(previous) = self.tracked.take() {
                if !previous.is_finished() {
                    debug!("aborting superseded save");
                }
                previous.abort();
            }
        }

        let updater = Arc::clone(&self.updater);
        let status = Arc::clone(&self.status);
        let last_error = Arc::clone(&self.last_error);
        let serial =
            (self.policy == OverlapPolicy::Serialize).then(|| Arc::clone(&self.serial));

        let task = tokio::spawn(async move {
            let _turn = match serial {
                Some(lock) => Some(lock.lock_owned().await),
                None => None,
            };

            match updater.update_flight(&flight).await {
                Ok(saved) => {
                    info!(flight = %saved, "flight saved");
                    status.send_replace(SaveStatus::Success);
                }
                Err(err) => {
                    error!(status = ?err.status(), error = %err, "failed to save flight");
                    *last_error.lock().expect("save error lock poisoned") = Some(err);
                    status.send_replace(SaveStatus::Error);
                }
            }
        });

        // With Race and Serialize the previous handle is detached, not aborted.
        self.tracked = Some(task);
    }

    /// Marks the save as failed without contacting the updater.
    pub(crate) fn refuse(&self, reason: &str) {
        warn!(reason, "save refused");
        self.status.send_replace(SaveStatus::Error);
    }

    pub fn status(&self) -> SaveStatus {
        *self.status.borrow()
    }

    pub fn message(&self) -> &'static str {
        self.status().message()
    }

    pub fn last_error(&self) -> Option<UpdateError> {
        self.last_error
            .lock()
            .expect("save error lock poisoned")
            .clone()
    }

    pub fn status_changes(&self) -> watch::Receiver<SaveStatus> {
        self.status.subscribe()
    }

    /// Whether the tracked save has not completed yet.
    pub fn is_saving(&self) -> bool {
        self.tracked
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Aborts the tracked save. Detached saves are not affected.
    pub fn teardown(&mut self) {
        if let Some(task) = self.tracked.take() {
            task.abort();
        }
    }
}

impl Drop for SaveCoordinator {
    fn drop(&mut self) {
        self.teardown();
    }
}
