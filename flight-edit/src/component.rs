use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use crate::config::FlightEditConfig;
use crate::flight::Flight;
use crate::form::FlightForm;
use crate::observer::ChangeObserver;
use crate::save::{SaveCoordinator, SaveStatus};
use crate::updater::{RecordUpdater, UpdateError};
use crate::validation::{CityValidator, KnownCities};

/// Edits one flight record and saves it through a [`RecordUpdater`].
///
/// Lifecycle: construct, [`init`](Self::init), feed input with
/// [`on_changes`](Self::on_changes), and finally [`destroy`](Self::destroy)
/// (also run on drop).
pub struct FlightEditComponent {
    form: FlightForm,
    observer: Option<ChangeObserver>,
    saves: SaveCoordinator,
    debounce: Duration,
    gate_on_validity: bool,
}

impl FlightEditComponent {
    pub fn new(updater: Arc<dyn RecordUpdater>, config: &FlightEditConfig) -> Self {
        let cities: Arc<dyn CityValidator> =
            Arc::new(KnownCities::new(config.known_cities.iter().cloned()));
        Self::with_city_validator(updater, cities, config)
    }

    pub fn with_city_validator(
        updater: Arc<dyn RecordUpdater>,
        cities: Arc<dyn CityValidator>,
        config: &FlightEditConfig,
    ) -> Self {
        Self {
            form: FlightForm::new(cities),
            observer: None,
            saves: SaveCoordinator::new(updater, config.overlap_policy),
            debounce: config.debounce(),
            gate_on_validity: config.gate_on_validity,
        }
    }

    /// Starts logging settled form values. Calling it again is a no-op.
    pub fn init(&mut self) {
        if self.observer.is_some() {
            return;
        }
        self.observer = Some(ChangeObserver::logging(self.form.subscribe(), self.debounce));
    }

    /// The host supplied a new flight (or none). An absent flight leaves the
    /// form untouched.
    pub fn on_changes(&mut self, flight: Option<&Flight>) {
        if let Some(flight) = flight {
            debug!(flight = %flight, "input flight changed");
            self.form.replace_values(flight);
        }
    }

    pub fn form(&self) -> &FlightForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FlightForm {
        &mut self.form
    }

    /// Saves the current form values, valid or not (unless gating on
    /// validity is configured). Returns immediately.
    pub fn save(&mut self) {
        if self.gate_on_validity && !self.form.is_valid() {
            self.saves.refuse("form is invalid");
            return;
        }
        self.saves.save(self.form.current_values());
    }

    pub fn message(&self) -> &'static str {
        self.saves.message()
    }

    pub fn status(&self) -> SaveStatus {
        self.saves.status()
    }

    pub fn status_changes(&self) -> watch::Receiver<SaveStatus> {
        self.saves.status_changes()
    }

    pub fn last_error(&self) -> Option<UpdateError> {
        self.saves.last_error()
    }

    pub fn is_saving(&self) -> bool {
        self.saves.is_saving()
    }

    /// Releases the change observer and the tracked save.
    pub fn destroy(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.cancel();
        }
        self.saves.teardown();
    }
}

impl Drop for FlightEditComponent {
    fn drop(&mut self) {
        self.destroy();
    }
}
