//! Debounced, de-duplicated view of the form's value changes.
//!
//! [`Debounce`] is the clock-agnostic state machine; [`ChangeObserver`] drives
//! it from a tokio task against the form's [`ValueChanges`] stream.

use std::mem;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::flight::Flight;
use crate::form::ValueChanges;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq)]
enum Phase<T> {
    /// Nothing received yet.
    Quiescent,
    /// A value is waiting for the window to close. `settled` is the last
    /// delivered value, if any.
    Pending {
        value: T,
        deadline: Instant,
        settled: Option<T>,
    },
    /// The last delivered value.
    Settled(T),
}

/// Trailing-edge debounce followed by distinct-until-changed.
///
/// Every [`push`](Debounce::push) restarts the window. Once the window has
/// passed without another push, [`poll`](Debounce::poll) yields the latest
/// value unless it equals the previously delivered one.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    window: Duration,
    phase: Phase<T>,
}

impl<T: Clone + PartialEq> Debounce<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            phase: Phase::Quiescent,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn push(&mut self, value: T, now: Instant) {
        let settled = match mem::replace(&mut self.phase, Phase::Quiescent) {
            Phase::Quiescent => None,
            Phase::Pending { settled, .. } => settled,
            Phase::Settled(last) => Some(last),
        };
        self.phase = Phase::Pending {
            value,
            deadline: now + self.window,
            settled,
        };
    }

    pub fn deadline(&self) -> Option<Instant> {
        match &self.phase {
            Phase::Pending { deadline, .. } => Some(*deadline),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending { .. })
    }

    pub fn last_delivered(&self) -> Option<&T> {
        match &self.phase {
            Phase::Quiescent => None,
            Phase::Pending { settled, .. } => settled.as_ref(),
            Phase::Settled(last) => Some(last),
        }
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.flush(),
            _ => None,
        }
    }

    /// Settles a pending value without waiting for the window.
    pub fn flush(&mut self) -> Option<T> {
        match mem::replace(&mut self.phase, Phase::Quiescent) {
            Phase::Pending { value, settled, .. } => {
                let unchanged = settled.as_ref() == Some(&value);
                self.phase = Phase::Settled(value.clone());
                (!unchanged).then_some(value)
            }
            other => {
                self.phase = other;
                None
            }
        }
    }
}

/// Handle to the background task observing form value changes.
///
/// The task is aborted by [`cancel`](ChangeObserver::cancel) or when the
/// handle is dropped.
#[derive(Debug)]
pub struct ChangeObserver {
    task: JoinHandle<()>,
}

impl ChangeObserver {
    pub fn spawn<F>(mut changes: ValueChanges, window: Duration, mut sink: F) -> Self
    where
        F: FnMut(Flight) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut debounce = Debounce::new(window);
            loop {
                let deadline = debounce.deadline();
                tokio::select! {
                    change = changes.recv() => match change {
                        Some(value) => debounce.push(value, Instant::now()),
                        None => {
                            if let Some(value) = debounce.flush() {
                                sink(value);
                            }
                            break;
                        }
                    },
                    _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                        if let Some(value) = debounce.poll(Instant::now()) {
                            sink(value);
                        }
                    }
                }
            }
            debug!("form change stream closed");
        });
        Self { task }
    }

    /// Observer whose only effect is a debug log entry per settled value.
    pub fn logging(changes: ValueChanges, window: Duration) -> Self {
        Self::spawn(changes, window, |flight| {
            debug!(
                id = flight.id,
                from = %flight.from,
                to = %flight.to,
                date = %flight.date,
                "flight form value settled"
            );
        })
    }

    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ChangeObserver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc::{self, UnboundedReceiver};
    use tokio::time::sleep;

    use super::*;
    use crate::form::FlightForm;
    use crate::validation::KnownCities;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn observed_form() -> (FlightForm, ChangeObserver, UnboundedReceiver<Flight>) {
        let mut form = FlightForm::new(Arc::new(KnownCities::default()));
        let (tx, rx) = mpsc::unbounded_channel();
        let observer = ChangeObserver::spawn(form.subscribe(), DEFAULT_DEBOUNCE, move |flight| {
            let _ = tx.send(flight);
        });
        (form, observer, rx)
    }

    fn delivered(rx: &mut UnboundedReceiver<Flight>) -> Vec<i64> {
        let mut ids = Vec::new();
        while let Ok(flight) = rx.try_recv() {
            ids.push(flight.id);
        }
        ids
    }

    #[test]
    fn debounce_waits_for_the_window_to_close() {
        let start = Instant::now();
        let mut debounce = Debounce::new(ms(250));

        debounce.push(1, start);
        debounce.push(2, start + ms(100));

        assert_eq!(debounce.deadline(), Some(start + ms(350)));
        assert_eq!(debounce.poll(start + ms(300)), None);
        assert_eq!(debounce.poll(start + ms(350)), Some(2));
        assert!(!debounce.is_pending());
        assert_eq!(debounce.last_delivered(), Some(&2));
    }

    #[test]
    fn debounce_suppresses_repeated_settled_value() {
        let start = Instant::now();
        let mut debounce = Debounce::new(ms(250));

        debounce.push("a", start);
        assert_eq!(debounce.poll(start + ms(250)), Some("a"));

        debounce.push("b", start + ms(300));
        debounce.push("a", start + ms(310));
        assert_eq!(debounce.poll(start + ms(600)), None);
        assert_eq!(debounce.last_delivered(), Some(&"a"));

        debounce.push("b", start + ms(700));
        assert_eq!(debounce.poll(start + ms(950)), Some("b"));
    }

    #[test]
    fn flush_on_quiescent_debounce_is_a_no_op() {
        let mut debounce: Debounce<u8> = Debounce::new(ms(250));
        assert_eq!(debounce.flush(), None);
        assert_eq!(debounce.deadline(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_are_delivered_once_with_the_last_value() {
        let (mut form, _observer, mut rx) = observed_form();

        form.set_id(1);
        sleep(ms(100)).await;
        form.set_id(2);
        sleep(ms(100)).await;
        form.set_id(3);
        sleep(ms(200)).await;
        assert!(delivered(&mut rx).is_empty());

        sleep(ms(100)).await;
        assert_eq!(delivered(&mut rx), vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn structurally_equal_values_are_delivered_once() {
        let (mut form, _observer, mut rx) = observed_form();

        form.set_id(1);
        sleep(ms(300)).await;
        form.set_id(2);
        form.set_id(1);
        sleep(ms(300)).await;

        assert_eq!(delivered(&mut rx), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_observer_delivers_nothing() {
        let (mut form, observer, mut rx) = observed_form();

        form.set_id(1);
        observer.cancel();
        sleep(ms(300)).await;
        form.set_id(2);
        sleep(ms(300)).await;

        assert!(observer.is_finished());
        assert!(delivered(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn pending_value_is_flushed_when_the_form_goes_away() {
        let (mut form, observer, mut rx) = observed_form();

        form.set_id(4);
        tokio::task::yield_now().await;
        drop(form);
        sleep(ms(10)).await;

        assert_eq!(delivered(&mut rx), vec![4]);
        assert!(observer.is_finished());
    }
}
