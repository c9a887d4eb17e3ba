use thiserror::Error;

use crate::flight::{FlightField, CITY_MAX_LENGTH, CITY_MIN_LENGTH, DATE_LENGTH};

pub const DEFAULT_KNOWN_CITIES: &[&str] = &[
    "Graz",
    "Hamburg",
    "Wien",
    "Vienna",
    "Frankfurt",
    "Berlin",
    "Zürich",
    "Salzburg",
    "Innsbruck",
    "München",
    "Paris",
    "London",
    "Rom",
    "Madrid",
    "Linz",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("value is required")]
    Required,
    #[error("must be at least {required} characters (got {actual})")]
    MinLength { required: usize, actual: usize },
    #[error("must be at most {required} characters (got {actual})")]
    MaxLength { required: usize, actual: usize },
    #[error("unknown city: {actual}")]
    City { actual: String },
}

/// City-name predicate used by the `from` and `to` controls.
pub trait CityValidator: Send + Sync {
    fn is_valid_city(&self, city: &str) -> bool;
}

/// Allow-list of city names, compared case-sensitively.
#[derive(Debug, Clone)]
pub struct KnownCities {
    cities: Vec<String>,
}

impl KnownCities {
    pub fn new<I, S>(cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cities: cities.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for KnownCities {
    fn default() -> Self {
        Self::new(DEFAULT_KNOWN_CITIES.iter().copied())
    }
}

impl CityValidator for KnownCities {
    fn is_valid_city(&self, city: &str) -> bool {
        self.cities.iter().any(|known| known == city)
    }
}

fn required(value: &str) -> Option<ValidationError> {
    value.is_empty().then_some(ValidationError::Required)
}

// Length rules leave empty values to `required`.
fn min_length(value: &str, min: usize) -> Option<ValidationError> {
    let actual = value.chars().count();
    (actual > 0 && actual < min).then_some(ValidationError::MinLength {
        required: min,
        actual,
    })
}

fn max_length(value: &str, max: usize) -> Option<ValidationError> {
    let actual = value.chars().count();
    (actual > max).then_some(ValidationError::MaxLength {
        required: max,
        actual,
    })
}

fn city(value: &str, cities: &dyn CityValidator) -> Option<ValidationError> {
    (!value.is_empty() && !cities.is_valid_city(value)).then(|| ValidationError::City {
        actual: value.to_string(),
    })
}

/// Runs every rule of a text control and returns all failures in rule order.
pub fn validate_text(
    field: FlightField,
    value: &str,
    cities: &dyn CityValidator,
) -> Vec<ValidationError> {
    match field {
        // An integer id is always present.
        FlightField::Id => Vec::new(),
        FlightField::From | FlightField::To => [
            required(value),
            min_length(value, CITY_MIN_LENGTH),
            max_length(value, CITY_MAX_LENGTH),
            city(value, cities),
        ]
        .into_iter()
        .flatten()
        .collect(),
        FlightField::Date => [
            required(value),
            min_length(value, DATE_LENGTH),
            max_length(value, DATE_LENGTH),
        ]
        .into_iter()
        .flatten()
        .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_errors(value: &str) -> Vec<ValidationError> {
        validate_text(FlightField::From, value, &KnownCities::default())
    }

    #[test]
    fn empty_city_only_reports_required() {
        assert_eq!(from_errors(""), vec![ValidationError::Required]);
    }

    #[test]
    fn short_city_is_rejected() {
        let errors = from_errors("Gz");
        assert!(errors.contains(&ValidationError::MinLength {
            required: 3,
            actual: 2
        }));
    }

    #[test]
    fn long_city_is_rejected() {
        let cities = KnownCities::new(["Sixteen-Letters!"]);
        let errors = validate_text(FlightField::To, "Sixteen-Letters!", &cities);
        assert_eq!(
            errors,
            vec![ValidationError::MaxLength {
                required: 15,
                actual: 16
            }]
        );
    }

    #[test]
    fn unknown_city_is_rejected() {
        assert_eq!(
            from_errors("Atlantis"),
            vec![ValidationError::City {
                actual: "Atlantis".to_string()
            }]
        );
    }

    #[test]
    fn known_city_within_bounds_is_valid() {
        assert!(from_errors("Graz").is_empty());
        assert!(from_errors("Vienna").is_empty());
    }

    #[test]
    fn city_length_counts_characters() {
        // "Zürich" is 7 bytes but 6 characters.
        assert!(from_errors("Zürich").is_empty());
    }

    #[test]
    fn date_must_be_exactly_33_characters() {
        let cities = KnownCities::default();
        let exact = "2024-01-01T00:00:00.000Z-test-abc";
        assert_eq!(exact.len(), DATE_LENGTH);

        assert!(validate_text(FlightField::Date, exact, &cities).is_empty());
        assert_eq!(
            validate_text(FlightField::Date, &exact[..32], &cities),
            vec![ValidationError::MinLength {
                required: 33,
                actual: 32
            }]
        );
        assert_eq!(
            validate_text(FlightField::Date, &format!("{exact}x"), &cities),
            vec![ValidationError::MaxLength {
                required: 33,
                actual: 34
            }]
        );
    }

    #[test]
    fn date_content_is_unconstrained() {
        let cities = KnownCities::default();
        let garbage = "#".repeat(DATE_LENGTH);
        assert!(validate_text(FlightField::Date, &garbage, &cities).is_empty());
    }
}
