//! Address search through Nominatim
//!
//! Free-text address parts go out as a structured `/search` query. Results
//! are mapped, narrowed to buildings and projected onto [`NamedPoint`]s.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::error::ServiceError;
use crate::fetch::{Fetch, Params, classify_fetch_error};
use crate::models::{LocationRequest, NamedPoint};

pub mod filter;
pub mod mapper;

pub use filter::filter_buildings;
pub use mapper::{map_raw_to_locations, to_named_points};

const GEOCODING_API: &str = "Geocoding";

/// Fixed parameters appended to every search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDefaults {
    pub format: String,
    pub address_details: bool,
    pub limit: u32,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            address_details: true,
            limit: 5,
        }
    }
}

/// Build the structured search query for `request`
#[must_use]
pub fn build_geocode_params(request: &LocationRequest, defaults: &SearchDefaults) -> Params {
    let mut params = vec![
        (
            "street".to_string(),
            format!("{} {}", request.street, request.house_number),
        ),
        ("city".to_string(), request.city.clone()),
        ("postalcode".to_string(), request.postal_code.clone()),
    ];

    if let Some(country) = request.country.as_deref().filter(|c| !c.is_empty()) {
        params.push(("country".to_string(), country.to_string()));
    }

    params.push(("format".to_string(), defaults.format.clone()));
    params.push((
        "addressdetails".to_string(),
        u8::from(defaults.address_details).to_string(),
    ));
    params.push(("limit".to_string(), defaults.limit.to_string()));
    params
}

pub struct GeocodeService {
    fetcher: Arc<dyn Fetch>,
    search_url: String,
    defaults: SearchDefaults,
}

impl GeocodeService {
    /// Service against the API rooted at `base_url` (e.g. `https://nominatim.openstreetmap.org`)
    pub fn new(fetcher: Arc<dyn Fetch>, base_url: &str, defaults: SearchDefaults) -> Self {
        Self {
            fetcher,
            search_url: format!("{}/search", base_url.trim_end_matches('/')),
            defaults,
        }
    }

    /// Search buildings matching `request`.
    ///
    /// An empty list means no result carried a house number; it is not an
    /// error.
    #[instrument(skip(self, request), fields(city = %request.city))]
    pub async fn search(&self, request: &LocationRequest) -> Result<Vec<NamedPoint>, ServiceError> {
        let params = build_geocode_params(request, &self.defaults);
        let raw = self
            .fetcher
            .fetch(&self.search_url, &params)
            .await
            .map_err(|e| classify_fetch_error(GEOCODING_API, e))?;

        let locations = map_raw_to_locations(&raw)?;
        let total = locations.len();
        let buildings = filter_buildings(locations);

        if buildings.is_empty() {
            info!("No building among {} geocoding results", total);
            return Ok(Vec::new());
        }

        debug!("Kept {} of {} geocoding results", buildings.len(), total);
        Ok(to_named_points(buildings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MappingError;
    use crate::fetch::FetchError;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct StubFetch(Result<Value, FetchError>);

    #[async_trait]
    impl Fetch for StubFetch {
        async fn fetch(
            &self,
            _url: &str,
            _params: &[(String, String)],
        ) -> Result<Value, FetchError> {
            self.0.clone()
        }
    }

    fn service(response: Result<Value, FetchError>) -> GeocodeService {
        GeocodeService::new(
            Arc::new(StubFetch(response)),
            "https://nominatim.test",
            SearchDefaults::default(),
        )
    }

    fn request(country: Option<&str>) -> LocationRequest {
        LocationRequest {
            street: "Main St".to_string(),
            house_number: "123".to_string(),
            city: "Springfield".to_string(),
            postal_code: "12345".to_string(),
            country: country.map(str::to_string),
        }
    }

    fn pairs(params: &Params) -> Vec<(&str, &str)> {
        params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_params_without_country() {
        let params = build_geocode_params(&request(None), &SearchDefaults::default());
        assert_eq!(
            pairs(&params),
            vec![
                ("street", "Main St 123"),
                ("city", "Springfield"),
                ("postalcode", "12345"),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", "5"),
            ]
        );
    }

    #[test]
    fn test_params_with_country() {
        let params = build_geocode_params(&request(Some("Austria")), &SearchDefaults::default());
        assert_eq!(pairs(&params)[3], ("country", "Austria"));

        let params = build_geocode_params(&request(Some("")), &SearchDefaults::default());
        assert!(params.iter().all(|(k, _)| k != "country"));
    }

    #[tokio::test]
    async fn test_search_keeps_only_buildings() {
        let service = service(Ok(json!([
            { "display_name": "123 Main St", "lat": "10.5", "lon": "20.5", "address": { "house_number": "123" } },
            { "display_name": "Main St", "lat": "10.0", "lon": "20.0", "address": { "road": "Main St" } }
        ])));

        let points = service.search(&request(None)).await.unwrap();
        assert_eq!(points, vec![NamedPoint::new("123 Main St", 10.5, 20.5)]);
    }

    #[tokio::test]
    async fn test_search_without_buildings_is_empty() {
        let service = service(Ok(json!([
            { "display_name": "Springfield", "lat": "10.0", "lon": "20.0", "address": {} }
        ])));
        assert!(service.search(&request(None)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_status_failure() {
        let err = service(Err(FetchError::Status(500)))
            .search(&request(None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ExternalApi { .. }));
        assert_eq!(err.to_string(), "Geocoding API returned 500");
    }

    #[tokio::test]
    async fn test_search_transport_failure() {
        let err = service(Err(FetchError::Transport("connection refused".into())))
            .search(&request(None))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to reach Geocoding API");
    }

    #[tokio::test]
    async fn test_search_invalid_payload() {
        let err = service(Err(FetchError::Payload("expected value".into())))
            .search(&request(None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ExternalApi { .. }));
        assert!(err.to_string().contains("invalid payload"));
    }

    #[tokio::test]
    async fn test_search_non_list_payload_is_mapping_error() {
        let err = service(Ok(json!({ "error": "Unable to geocode" })))
            .search(&request(None))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Mapping(MappingError::InvalidFormat(_))
        ));
    }
}
