use serde::{Deserialize, Serialize};
use std::fmt;

/// Encoded timestamps coming from the flight API are always this long,
/// e.g. `2024-03-01T08:15:00.0000000+01:00`.
pub const DATE_LENGTH: usize = 33;
pub const CITY_MIN_LENGTH: usize = 3;
pub const CITY_MAX_LENGTH: usize = 15;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: i64,
    pub from: String,
    pub to: String,
    pub date: String,
}

impl Flight {
    pub fn new(
        id: i64,
        from: impl Into<String>,
        to: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id,
            from: from.into(),
            to: to.into(),
            date: date.into(),
        }
    }
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} -> {} ({})", self.id, self.from, self.to, self.date)
    }
}

/// Partial flight record. Fields left as `None` keep whatever the form
/// currently holds when the patch is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPatch {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl From<&Flight> for FlightPatch {
    fn from(flight: &Flight) -> Self {
        Self {
            id: Some(flight.id),
            from: Some(flight.from.clone()),
            to: Some(flight.to.clone()),
            date: Some(flight.date.clone()),
        }
    }
}

impl From<Flight> for FlightPatch {
    fn from(flight: Flight) -> Self {
        Self {
            id: Some(flight.id),
            from: Some(flight.from),
            to: Some(flight.to),
            date: Some(flight.date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightField {
    Id,
    From,
    To,
    Date,
}

impl FlightField {
    pub const ALL: [FlightField; 4] = [
        FlightField::Id,
        FlightField::From,
        FlightField::To,
        FlightField::Date,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FlightField::Id => "id",
            FlightField::From => "from",
            FlightField::To => "to",
            FlightField::Date => "date",
        }
    }
}

impl fmt::Display for FlightField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}
