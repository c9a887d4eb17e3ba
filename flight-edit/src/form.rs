use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

use crate::flight::{Flight, FlightField, FlightPatch};
use crate::validation::{validate_text, CityValidator, ValidationError};

/// Stream of committed form values. Each commit carries the whole record.
pub type ValueChanges = UnboundedReceiver<Flight>;

/// When typed text becomes the control's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOn {
    Change,
    Blur,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("id must be an integer, got {0:?}")]
    InvalidId(String),
}

#[derive(Debug, Clone)]
struct TextControl {
    value: String,
    pending: Option<String>,
    update_on: UpdateOn,
    errors: Vec<ValidationError>,
    dirty: bool,
    touched: bool,
}

impl TextControl {
    fn new(update_on: UpdateOn) -> Self {
        Self {
            value: String::new(),
            pending: None,
            update_on,
            errors: Vec::new(),
            dirty: false,
            touched: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct IdControl {
    value: i64,
    dirty: bool,
    touched: bool,
}

/// Editable flight record with per-field validation.
///
/// `from` and `to` commit typed text on blur, `id` and `date` on every
/// change. Every commit, and every [`FlightForm::replace_values`] call, is
/// published once to all [`FlightForm::subscribe`]rs.
pub struct FlightForm {
    id: IdControl,
    from: TextControl,
    to: TextControl,
    date: TextControl,
    cities: Arc<dyn CityValidator>,
    subscribers: Vec<UnboundedSender<Flight>>,
}

impl FlightForm {
    pub fn new(cities: Arc<dyn CityValidator>) -> Self {
        let mut form = Self {
            id: IdControl::default(),
            from: TextControl::new(UpdateOn::Blur),
            to: TextControl::new(UpdateOn::Blur),
            date: TextControl::new(UpdateOn::Change),
            cities,
            subscribers: Vec::new(),
        };
        form.revalidate(FlightField::From);
        form.revalidate(FlightField::To);
        form.revalidate(FlightField::Date);
        form
    }

    pub fn subscribe(&mut self) -> ValueChanges {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Shallow merge: only the fields present in `patch` are written.
    /// Pending blur input on written fields is discarded.
    pub fn replace_values(&mut self, patch: impl Into<FlightPatch>) {
        let patch = patch.into();
        if let Some(id) = patch.id {
            self.id.value = id;
        }
        for (field, value) in [
            (FlightField::From, patch.from),
            (FlightField::To, patch.to),
            (FlightField::Date, patch.date),
        ] {
            if let Some(value) = value {
                if let Some(control) = self.text_control_mut(field) {
                    control.value = value;
                    control.pending = None;
                }
                self.revalidate(field);
            }
        }
        self.emit();
    }

    /// Committed values, whether valid or not. Pending blur input is not
    /// included.
    pub fn current_values(&self) -> Flight {
        Flight {
            id: self.id.value,
            from: self.from.value.clone(),
            to: self.to.value.clone(),
            date: self.date.value.clone(),
        }
    }

    pub fn set_id(&mut self, id: i64) {
        self.id.value = id;
        self.id.dirty = true;
        self.emit();
    }

    /// User typing into a field.
    pub fn input(&mut self, field: FlightField, text: &str) -> Result<(), InputError> {
        let Some(control) = self.text_control_mut(field) else {
            let id = text
                .trim()
                .parse::<i64>()
                .map_err(|_| InputError::InvalidId(text.to_string()))?;
            self.set_id(id);
            return Ok(());
        };

        match control.update_on {
            UpdateOn::Change => {
                control.value = text.to_string();
                control.dirty = true;
                self.revalidate(field);
                self.emit();
            }
            UpdateOn::Blur => {
                control.pending = Some(text.to_string());
            }
        }
        Ok(())
    }

    /// Focus left `field`: marks it touched and commits pending input.
    pub fn blur(&mut self, field: FlightField) {
        let Some(control) = self.text_control_mut(field) else {
            self.id.touched = true;
            return;
        };
        control.touched = true;
        let Some(pending) = control.pending.take() else {
            return;
        };
        control.value = pending;
        control.dirty = true;
        self.revalidate(field);
        self.emit();
    }

    pub fn validity_of(&self, field: FlightField) -> bool {
        self.errors_of(field).is_empty()
    }

    pub fn errors_of(&self, field: FlightField) -> &[ValidationError] {
        self.text_control(field)
            .map(|control| control.errors.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_valid(&self) -> bool {
        FlightField::ALL.iter().all(|field| self.validity_of(*field))
    }

    pub fn is_dirty(&self) -> bool {
        self.id.dirty || self.from.dirty || self.to.dirty || self.date.dirty
    }

    pub fn is_pristine(&self) -> bool {
        !self.is_dirty()
    }

    pub fn is_touched(&self, field: FlightField) -> bool {
        self.text_control(field)
            .map(|control| control.touched)
            .unwrap_or(self.id.touched)
    }

    /// Text typed into a blur-committed field that has not been committed yet.
    pub fn pending_input(&self, field: FlightField) -> Option<&str> {
        self.text_control(field)
            .and_then(|control| control.pending.as_deref())
    }

    pub fn update_on(&self, field: FlightField) -> UpdateOn {
        self.text_control(field)
            .map(|control| control.update_on)
            .unwrap_or(UpdateOn::Change)
    }

    fn text_control(&self, field: FlightField) -> Option<&TextControl> {
        match field {
            FlightField::Id => None,
            FlightField::From => Some(&self.from),
            FlightField::To => Some(&self.to),
            FlightField::Date => Some(&self.date),
        }
    }

    fn text_control_mut(&mut self, field: FlightField) -> Option<&mut TextControl> {
        match field {
            FlightField::Id => None,
            FlightField::From => Some(&mut self.from),
            FlightField::To => Some(&mut self.to),
            FlightField::Date => Some(&mut self.date),
        }
    }

    fn revalidate(&mut self, field: FlightField) {
        let cities = Arc::clone(&self.cities);
        if let Some(control) = self.text_control_mut(field) {
            control.errors = validate_text(field, &control.value, &*cities);
        }
    }

    fn emit(&mut self) {
        let value = self.current_values();
        trace!(flight = %value, "form value changed");
        self.subscribers.retain(|tx| tx.send(value.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::KnownCities;

    const DATE: &str = "2024-01-01T00:00:00.000Z-test-abc";

    fn test_form() -> FlightForm {
        FlightForm::new(Arc::new(KnownCities::default()))
    }

    fn drain(rx: &mut ValueChanges) -> Vec<Flight> {
        let mut values = Vec::new();
        while let Ok(value) = rx.try_recv() {
            values.push(value);
        }
        values
    }

    #[test]
    fn new_form_starts_with_empty_defaults() {
        let form = test_form();

        assert_eq!(form.current_values(), Flight::default());
        assert!(form.validity_of(FlightField::Id));
        assert!(!form.validity_of(FlightField::From));
        assert_eq!(form.errors_of(FlightField::Date), &[ValidationError::Required]);
        assert!(form.is_pristine());
    }

    #[test]
    fn replace_values_overwrites_every_field() {
        let mut form = test_form();
        let flight = Flight::new(1, "Graz", "Vienna", DATE);

        form.replace_values(&flight);

        assert_eq!(form.current_values(), flight);
        assert!(form.is_valid());
        assert!(form.is_pristine());
    }

    #[test]
    fn replace_values_keeps_fields_missing_from_patch() {
        let mut form = test_form();
        form.replace_values(&Flight::new(1, "Graz", "Vienna", DATE));

        form.replace_values(FlightPatch {
            to: Some("Hamburg".to_string()),
            ..FlightPatch::default()
        });

        assert_eq!(form.current_values(), Flight::new(1, "Graz", "Hamburg", DATE));
    }

    #[test]
    fn replace_values_emits_once_per_call() {
        let mut form = test_form();
        let mut rx = form.subscribe();

        form.replace_values(&Flight::new(1, "Graz", "Vienna", DATE));

        assert_eq!(drain(&mut rx), vec![Flight::new(1, "Graz", "Vienna", DATE)]);
    }

    #[test]
    fn city_input_commits_on_blur() {
        let mut form = test_form();
        let mut rx = form.subscribe();

        form.input(FlightField::From, "Gr").unwrap();
        form.input(FlightField::From, "Graz").unwrap();

        assert_eq!(form.current_values().from, "");
        assert_eq!(form.pending_input(FlightField::From), Some("Graz"));
        assert!(drain(&mut rx).is_empty());

        form.blur(FlightField::From);

        assert_eq!(form.current_values().from, "Graz");
        assert!(form.validity_of(FlightField::From));
        assert!(form.is_touched(FlightField::From));
        assert!(form.is_dirty());
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[test]
    fn blur_without_pending_input_does_not_emit() {
        let mut form = test_form();
        let mut rx = form.subscribe();

        form.blur(FlightField::To);

        assert!(form.is_touched(FlightField::To));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn date_input_commits_immediately() {
        let mut form = test_form();
        let mut rx = form.subscribe();

        form.input(FlightField::Date, "short").unwrap();

        assert_eq!(form.current_values().date, "short");
        assert!(!form.validity_of(FlightField::Date));
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[test]
    fn id_input_must_be_an_integer() {
        let mut form = test_form();

        form.input(FlightField::Id, "42").unwrap();
        assert_eq!(form.current_values().id, 42);

        assert_eq!(
            form.input(FlightField::Id, "abc"),
            Err(InputError::InvalidId("abc".to_string()))
        );
        assert_eq!(form.current_values().id, 42);
    }

    #[test]
    fn replace_values_discards_pending_input() {
        let mut form = test_form();
        form.input(FlightField::To, "Hamburg").unwrap();

        form.replace_values(&Flight::new(3, "Graz", "Wien", DATE));
        form.blur(FlightField::To);

        assert_eq!(form.current_values().to, "Wien");
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut form = test_form();
        let rx = form.subscribe();
        let mut live = form.subscribe();
        drop(rx);

        form.set_id(5);

        assert_eq!(form.subscribers.len(), 1);
        assert_eq!(drain(&mut live).len(), 1);
    }
}
