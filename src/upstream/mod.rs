//! Clients for the third-party services behind the API.
//!
//! Open-Meteo (forecast + geocoding) and Nominatim need no key; Groq does.
//! Base URLs come from [`UpstreamConfig`](crate::config::UpstreamConfig) so
//! tests can point every client at a mock server.

mod groq;
mod nominatim;
mod open_meteo;
mod places;

use reqwest::Client;

pub use groq::GroqClient;
pub use nominatim::{NominatimAddress, NominatimClient, NominatimPlace, NominatimQuery, ViewBox};
pub use open_meteo::OpenMeteoClient;
pub use places::{discover_activity_places, find_activity_places, geocode_location};

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("{service} returned status {status}")]
    Status { service: &'static str, status: u16 },
    #[error("Unexpected {service} response: {reason}")]
    Decode {
        service: &'static str,
        reason: String,
    },
    #[error("API key not configured")]
    MissingApiKey,
}

impl UpstreamError {
    /// HTTP status reported by the upstream, if that is what failed
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Shared HTTP client; individual requests set their own timeouts
pub fn build_http_client(user_agent: &str) -> Result<Client, UpstreamError> {
    Ok(Client::builder().user_agent(user_agent).build()?)
}

/// Turn a non-success status into an error
pub(crate) fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(UpstreamError::Status {
            service,
            status: status.as_u16(),
        })
    }
}
