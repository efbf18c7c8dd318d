//! HTTP client for the catalog API

use crate::config::ExportConfig;
use reqwest::{StatusCode, Url};
use seabed_common::dto::{MapData, MapDataFilter};
use thiserror::Error;

const MAP_DATA_PATH: &str = "api/MapFilter/map-data";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid API base URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: StatusCode, body: String },
}

pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(config: &ExportConfig) -> Result<Self, ClientError> {
        let invalid = |message: String| ClientError::InvalidUrl {
            url: config.api_base_url.clone(),
            message,
        };

        // Trailing slash so joins append instead of replacing the last segment
        let mut base = config.api_base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_string()));
        }

        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;

        Ok(Self { http, base_url })
    }

    /// `GET api/MapFilter/map-data` with the filters as query parameters
    pub fn map_data_request(&self, filters: &MapDataFilter) -> Result<reqwest::Request, ClientError> {
        let url = self.base_url.join(MAP_DATA_PATH).map_err(|e| ClientError::InvalidUrl {
            url: self.base_url.to_string(),
            message: e.to_string(),
        })?;

        Ok(self.http.get(url).query(filters).build()?)
    }

    /// Fetch the map-data document with the given filters
    pub async fn fetch_map_data(&self, filters: &MapDataFilter) -> Result<MapData, ClientError> {
        let request = self.map_data_request(filters)?;
        tracing::debug!(url = %request.url(), "Requesting map data");

        let response = self.http.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        Ok(response.json::<MapData>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> CatalogClient {
        let config = ExportConfig {
            api_base_url: base.to_string(),
            timeout_secs: 2,
            ..Default::default()
        };
        CatalogClient::new(&config).unwrap()
    }

    #[test]
    fn test_map_data_url_without_filters() {
        let request = client("http://localhost:8080")
            .map_data_request(&MapDataFilter::default())
            .unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:8080/api/MapFilter/map-data");
    }

    #[test]
    fn test_map_data_url_keeps_base_path() {
        let filters = MapDataFilter { contractor_id: Some(2), ..Default::default() };
        let request = client("https://catalog.example.org/seabed/")
            .map_data_request(&filters)
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://catalog.example.org/seabed/api/MapFilter/map-data?contractorId=2"
        );
    }

    #[test]
    fn test_filter_values_are_encoded() {
        let filters = MapDataFilter {
            sponsoring_state: Some("Korea, Republic of".into()),
            year: Some(2001),
            ..Default::default()
        };
        let request = client("http://localhost:8080").map_data_request(&filters).unwrap();
        assert_eq!(
            request.url().query(),
            Some("sponsoringState=Korea%2C+Republic+of&year=2001")
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ExportConfig { api_base_url: "not a url".into(), ..Default::default() };
        assert!(matches!(
            CatalogClient::new(&config),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_api_fails() {
        let result = client("http://127.0.0.1:9").fetch_map_data(&MapDataFilter::default()).await;
        let err = tokio_test::assert_err!(result);
        assert!(matches!(err, ClientError::Request(_)));
    }
}
