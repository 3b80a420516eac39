//! JCDecaux VLS v1 HTTP adapter for live station telemetry.

use tracing::{error, info};

use crate::error::FetchError;
use crate::station::{StationId, StationRecord};
use crate::traits::StationSource;

/// Environment variable holding the feed API key.
pub const API_KEY_ENV: &str = "JCDECAUX_API_KEY";

/// Feed endpoint, credentials and station exclusions.
#[derive(Debug, Clone)]
pub struct JcDecauxConfig {
    pub base_url: String,
    pub contract: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Station numbers dropped before records reach the core.
    pub excluded_ids: Vec<StationId>,
}

impl Default for JcDecauxConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jcdecaux.com/vls/v1".to_string(),
            contract: "nancy".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
            excluded_ids: Vec::new(),
        }
    }
}

impl JcDecauxConfig {
    /// Default config for `contract` with the key taken from `JCDECAUX_API_KEY`.
    pub fn from_env(contract: impl Into<String>) -> Result<Self, FetchError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(FetchError::MissingApiKey)?;
        Ok(Self {
            contract: contract.into(),
            api_key,
            ..Self::default()
        })
    }

    /// Station list endpoint for the configured contract, key included.
    pub fn stations_url(&self) -> String {
        format!(
            "{}/stations?contract={}&apiKey={}",
            self.base_url.trim_end_matches('/'),
            self.contract,
            self.api_key
        )
    }
}

/// Blocking client for the JCDecaux station list.
#[derive(Debug, Clone)]
pub struct JcDecauxClient {
    config: JcDecauxConfig,
    client: reqwest::blocking::Client,
}

impl JcDecauxClient {
    /// Builds a blocking client. Fails without an API key.
    pub fn new(config: JcDecauxConfig) -> Result<Self, FetchError> {
        if config.api_key.is_empty() {
            return Err(FetchError::MissingApiKey);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &JcDecauxConfig {
        &self.config
    }
}

impl StationSource for JcDecauxClient {
    fn fetch_stations(&self) -> Result<Vec<StationRecord>, FetchError> {
        info!(contract = %self.config.contract, "requesting station feed");

        let response = self
            .client
            .get(self.config.stations_url())
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<Vec<StationRecord>>());

        match response {
            Ok(records) => {
                let received = records.len();
                let records = filter_excluded(records, &self.config.excluded_ids);
                info!(received, kept = records.len(), "station feed received");
                Ok(records)
            }
            Err(err) => {
                let err = FetchError::from(err);
                error!(%err, "station feed request failed");
                Err(err)
            }
        }
    }
}

fn filter_excluded(records: Vec<StationRecord>, excluded: &[StationId]) -> Vec<StationRecord> {
    records
        .into_iter()
        .filter(|record| !excluded.contains(&record.number))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::Position;

    #[test]
    fn test_builds_stations_url() {
        let config = JcDecauxConfig {
            base_url: "http://localhost:8080/vls/v1/".to_string(),
            contract: "nancy".to_string(),
            api_key: "secret".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.stations_url(),
            "http://localhost:8080/vls/v1/stations?contract=nancy&apiKey=secret"
        );
    }

    #[test]
    fn test_client_requires_api_key() {
        let err = JcDecauxClient::new(JcDecauxConfig::default()).unwrap_err();
        assert!(matches!(err, FetchError::MissingApiKey));
    }

    #[test]
    fn test_drops_excluded_numbers() {
        let record = |number| StationRecord {
            number,
            name: format!("{} - S", number),
            position: Position { lat: 48.69, lng: 6.18 },
            available_bikes: 1,
            available_bike_stands: Some(9),
            bike_stands: None,
        };
        let kept = filter_excluded(vec![record(3), record(4), record(9)], &[3, 9]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].number, 4);
    }

    #[test]
    fn test_failed_request_does_not_leak_api_key() {
        let config = JcDecauxConfig {
            base_url: "http://127.0.0.1:1/vls/v1".to_string(),
            api_key: "top-secret-key".to_string(),
            timeout_secs: 2,
            ..Default::default()
        };
        let client = JcDecauxClient::new(config).unwrap();
        let err = client.fetch_stations().unwrap_err();
        assert!(!err.to_string().contains("top-secret-key"), "{}", err);
        assert!(!format!("{:?}", err).contains("top-secret-key"), "{:?}", err);
    }
}
