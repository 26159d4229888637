//! Blocking HTTP client for the role-info backend.
//!
//! Lookups run on the async compute pool so the UI thread never waits on the
//! network; a global agent timeout bounds every request.

use std::time::Duration;

use bevy::prelude::*;
use constants::lookup::{INFO_LOOKUP_TIMEOUT_SECS, INFO_ROUTE};
use thiserror::Error;

use crate::engine::assets::info_record::{InfoRecord, normalise_records};

/// Errors produced by an info lookup. Callers map these to fallback popups;
/// they never surface to the user as faults.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected payload: {0}")]
    Decode(String),
}

/// HTTP client bound to the configured backend. Cheap to clone, so each
/// spawned lookup task carries its own copy.
#[derive(Resource, Clone)]
pub struct InfoClient {
    agent: ureq::Agent,
    base_url: String,
}

impl InfoClient {
    pub fn new(base_url: &str) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(INFO_LOOKUP_TIMEOUT_SECS)))
            .build();
        Self {
            agent: config.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET {base}/info-building/{role}` → records, latest first. An empty
    /// list means no data has been posted for the role.
    pub fn fetch_role_info(&self, role: &str) -> Result<Vec<InfoRecord>, LookupError> {
        let url = route_url(&self.base_url, role);
        let mut response = self
            .agent
            .get(&url)
            .call()
            .map_err(|err| LookupError::Transport(err.to_string()))?;
        let payload: serde_json::Value = response
            .body_mut()
            .read_json()
            .map_err(|err| LookupError::Decode(err.to_string()))?;
        normalise_records(payload).map_err(|err| LookupError::Decode(err.to_string()))
    }
}

fn route_url(base_url: &str, role: &str) -> String {
    format!("{base_url}/{INFO_ROUTE}/{role}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_follows_the_backend_convention() {
        assert_eq!(
            route_url("http://localhost:8000", "bsit"),
            "http://localhost:8000/info-building/bsit"
        );
    }

    #[test]
    fn trailing_slashes_are_trimmed_from_the_base() {
        let client = InfoClient::new("http://campus.local/");
        assert_eq!(client.base_url, "http://campus.local");
    }
}
