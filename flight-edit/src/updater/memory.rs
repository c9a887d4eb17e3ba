use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::{RecordUpdater, UpdateError};
use crate::flight::Flight;

/// Local stand-in for the flight API, used by dev mode.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFlightStore {
    flights: Arc<Mutex<BTreeMap<i64, Flight>>>,
}

impl InMemoryFlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        let store = Self::new();
        {
            let mut flights = store.flights.lock().expect("flight store lock poisoned");
            for flight in seed_flights() {
                flights.insert(flight.id, flight);
            }
        }
        store
    }

    pub fn get(&self, id: i64) -> Option<Flight> {
        self.flights
            .lock()
            .expect("flight store lock poisoned")
            .get(&id)
            .cloned()
    }

    pub fn all(&self) -> Vec<Flight> {
        self.flights
            .lock()
            .expect("flight store lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    fn upsert(&self, flight: &Flight) -> Flight {
        let mut flights = self.flights.lock().expect("flight store lock poisoned");
        let mut stored = flight.clone();
        // id 0 means "new flight"
        if stored.id == 0 {
            stored.id = flights.keys().next_back().map_or(1, |last| last + 1);
        }
        flights.insert(stored.id, stored.clone());
        stored
    }
}

#[async_trait]
impl RecordUpdater for InMemoryFlightStore {
    async fn update_flight(&self, flight: &Flight) -> Result<Flight, UpdateError> {
        let stored = self.upsert(flight);
        debug!(flight = %stored, "stored flight in memory");
        Ok(stored)
    }
}

fn seed_flights() -> Vec<Flight> {
    vec![
        Flight::new(1, "Graz", "Hamburg", "2024-03-01T08:15:00.0000000+01:00"),
        Flight::new(2, "Hamburg", "Graz", "2024-03-01T17:40:00.0000000+01:00"),
        Flight::new(3, "Wien", "Frankfurt", "2024-03-02T06:55:00.0000000+01:00"),
    ]
}
