//! Edit-and-save workflow for a single flight record.
//!
//! [`FlightEditComponent`] binds a [`Flight`] to a validated [`FlightForm`],
//! logs settled edits through a debounced [`ChangeObserver`], and submits the
//! form through a [`RecordUpdater`], reporting the outcome as a [`SaveStatus`].

mod component;
mod config;
mod flight;
mod form;
pub mod observer;
mod save;
pub mod updater;
mod validation;

pub use component::*;
pub use config::*;
pub use flight::*;
pub use form::*;
pub use observer::{ChangeObserver, Debounce, DEFAULT_DEBOUNCE};
pub use save::*;
pub use updater::{HttpFlightClient, InMemoryFlightStore, RecordUpdater, UpdateError};
pub use validation::*;
