use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use tracing::{debug, instrument};

use super::{RecordUpdater, UpdateError};
use crate::flight::Flight;

const FLIGHT_PATH: &str = "flight";

/// Saves flights against the flight REST API (`POST {api_url}/flight`).
#[derive(Debug, Clone)]
pub struct HttpFlightClient {
    client: Client,
    base_url: Url,
}

impl HttpFlightClient {
    pub fn new(api_url: &str) -> Result<Self, UpdateError> {
        // Trailing slash so relative joins append instead of replacing the
        // last path segment.
        let base_url = Url::parse(&format!("{}/", api_url.trim_end_matches('/')))
            .map_err(|e| UpdateError::transport(format!("Invalid API URL {api_url}: {e}")))?;

        let client = Client::builder()
            .build()
            .map_err(|e| UpdateError::transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, UpdateError> {
        self.base_url
            .join(path)
            .map_err(|e| UpdateError::transport(format!("Failed to build URL for {path}: {e}")))
    }

    async fn error_from_response(response: Response) -> UpdateError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        UpdateError::http(status.as_u16(), error_message(status, body))
    }
}

fn error_message(status: StatusCode, body: String) -> String {
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}

#[async_trait]
impl RecordUpdater for HttpFlightClient {
    #[instrument(skip(self), fields(flight_id = flight.id))]
    async fn update_flight(&self, flight: &Flight) -> Result<Flight, UpdateError> {
        let url = self.endpoint(FLIGHT_PATH)?;
        debug!(%url, "saving flight");

        let response = self
            .client
            .post(url)
            .json(flight)
            .send()
            .await
            .map_err(|e| UpdateError::transport(format!("Failed to call POST /flight: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        response
            .json::<Flight>()
            .await
            .map_err(|e| UpdateError::transport(format!("Failed to parse POST /flight response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_to_api_path() {
        let client = HttpFlightClient::new("http://www.angular.at/api").unwrap();
        assert_eq!(
            client.endpoint(FLIGHT_PATH).unwrap().as_str(),
            "http://www.angular.at/api/flight"
        );
    }

    #[test]
    fn trailing_slash_in_api_url_is_tolerated() {
        let client = HttpFlightClient::new("http://localhost:3000/api/").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:3000/api/");
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        let err = HttpFlightClient::new("not a url").unwrap_err();
        assert_eq!(err.status(), None);
    }

    #[test]
    fn empty_error_body_falls_back_to_reason_phrase() {
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, "  ".to_string()),
            "Not Found"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, "invalid date".to_string()),
            "invalid date"
        );
    }
}
